//! `GaScheduler`: a permutation-encoded genetic algorithm over the same
//! `Scheduler` contract as the CP engine.

use std::sync::Arc;
use std::time::{Duration as WallClock, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::ScheduleError;
use crate::estimator::{EstimationMatrix, TimeEstimator};
use crate::model::Project;
use crate::scheduler::{Parallelism, ReentrancyGuard, Scheduler, SchedulerSolution};

use super::chromosome::{self, Permutation};
use super::decoder;

/// Name this scheduler registers under: `"jenetics"`.
pub const NAME: &str = "jenetics";

#[derive(Debug, Clone, Copy)]
pub struct GaSettings {
    pub population_size: usize,
    pub generations: usize,
    pub tournament_size: usize,
    pub crossover_rate: f64,
    pub mutation_rate: f64,
    pub elitism: usize,
    pub seed: u64,
}

impl Default for GaSettings {
    fn default() -> Self {
        Self {
            population_size: 60,
            generations: 300,
            tournament_size: 3,
            crossover_rate: 0.9,
            mutation_rate: 0.2,
            elitism: 2,
            seed: 0,
        }
    }
}

/// Permutation genetic algorithm: evolves orderings of task indices,
/// decoding each one through [`decoder::decode`] to get its fitness.
pub struct GaScheduler {
    guard: ReentrancyGuard,
    estimator: Arc<dyn TimeEstimator>,
    settings: GaSettings,
}

impl GaScheduler {
    pub fn new(estimator: Arc<dyn TimeEstimator>) -> Self {
        Self {
            guard: ReentrancyGuard::new(),
            estimator,
            settings: GaSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: GaSettings) -> Self {
        self.settings = settings;
        self
    }
}

impl Scheduler for GaScheduler {
    fn name(&self) -> &str {
        NAME
    }

    fn guard(&self) -> &ReentrancyGuard {
        &self.guard
    }

    fn solve_optimization_problem(
        &self,
        project: &Project,
        time_limit: WallClock,
        parallel: Parallelism,
        on_progress: &mut (dyn FnMut(&SchedulerSolution) + Send),
    ) -> Result<SchedulerSolution, ScheduleError> {
        let start = Instant::now();
        let deadline = start + time_limit;
        let matrix = EstimationMatrix::new(project, self.estimator.as_ref());
        let n_tasks = project.all_tasks().len();

        if n_tasks == 0 {
            let decoded = decoder::decode(project, &matrix, &[])?;
            let solution = SchedulerSolution::new(decoded.project, true, start.elapsed())
                .with_stat("solver", "Jenetics");
            on_progress(&solution);
            return Ok(solution);
        }

        let settings = self.settings;
        let workers = parallel.resolve().max(1);
        let mut rng = StdRng::seed_from_u64(settings.seed);

        let mut population: Vec<(Permutation, i64)> = (0..settings.population_size)
            .map(|_| {
                let individual = chromosome::random_permutation(n_tasks, &mut rng);
                let fitness = decoder::decode(project, &matrix, &individual)
                    .map(|d| d.fitness)
                    .unwrap_or(i64::MAX);
                (individual, fitness)
            })
            .collect();
        population.sort_by_key(|(_, fitness)| *fitness);

        let mut best_fitness = population[0].1;
        let mut best_individual = population[0].0.clone();
        let mut generations_run = 0usize;
        let mut emit_best = |best_individual: &Permutation, generations_run: usize, optimal: bool, on_progress: &mut (dyn FnMut(&SchedulerSolution) + Send)| -> Result<SchedulerSolution, ScheduleError> {
            let decoded = decoder::decode(project, &matrix, best_individual)?;
            let solution = SchedulerSolution::new(decoded.project, optimal, start.elapsed())
                .with_stat("solver", "Jenetics")
                .with_stat("generations", generations_run as i64)
                .with_stat("fitness", decoded.fitness as f64)
                .with_stat("populationSize", settings.population_size as i64)
                .with_stat("workers", workers as i64);
            on_progress(&solution);
            Ok(solution)
        };

        let mut last_emitted = emit_best(&best_individual, 0, false, on_progress)?;

        for generation in 0..settings.generations {
            if Instant::now() >= deadline {
                break;
            }
            generations_run = generation + 1;

            let mut next_generation: Vec<(Permutation, i64)> = population
                .iter()
                .take(settings.elitism)
                .cloned()
                .collect();

            while next_generation.len() < settings.population_size {
                let parent_a = chromosome::tournament_select(&population, settings.tournament_size, &mut rng);
                let parent_b = chromosome::tournament_select(&population, settings.tournament_size, &mut rng);

                let mut child = if rand::Rng::random_bool(&mut rng, settings.crossover_rate) {
                    chromosome::order_crossover(parent_a, parent_b, &mut rng)
                } else {
                    parent_a.clone()
                };

                if rand::Rng::random_bool(&mut rng, settings.mutation_rate) {
                    chromosome::swap_mutation(&mut child, &mut rng);
                }

                let fitness = decoder::decode(project, &matrix, &child)
                    .map(|d| d.fitness)
                    .unwrap_or(i64::MAX);
                next_generation.push((child, fitness));
            }

            next_generation.sort_by_key(|(_, fitness)| *fitness);
            population = next_generation;

            if population[0].1 < best_fitness {
                best_fitness = population[0].1;
                best_individual = population[0].0.clone();
                last_emitted = emit_best(&best_individual, generations_run, false, on_progress)?;
            }
        }

        let exhausted = generations_run >= settings.generations;
        if exhausted {
            // Don't re-emit through `on_progress`: its fitness is identical to
            // `last_emitted`'s (only `optimal` differs), and `on_progress` feeds
            // `SolutionHistory::push`, which asserts strict improvement. Build
            // the final solution directly and let the caller's post-search
            // bookkeeping (which tolerates an equal-objective final value)
            // decide whether to record it, mirroring `CpScheduler`.
            let decoded = decoder::decode(project, &matrix, &best_individual)?;
            last_emitted = SchedulerSolution::new(decoded.project, true, start.elapsed())
                .with_stat("solver", "Jenetics")
                .with_stat("generations", generations_run as i64)
                .with_stat("fitness", decoded.fitness as f64)
                .with_stat("populationSize", settings.population_size as i64)
                .with_stat("workers", workers as i64);
        }

        Ok(last_emitted)
    }
}
