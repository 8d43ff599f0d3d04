//! `CpScheduler`: the `Scheduler` implementation built on the constraint
//! model and branch-and-bound search in this module.

use std::sync::Arc;
use std::time::{Duration as WallClock, Instant};

use crate::error::ScheduleError;
use crate::estimator::{EstimationMatrix, TimeEstimator};
use crate::model::Project;
use crate::scheduler::{Parallelism, ReentrancyGuard, Scheduler, SchedulerSolution};

use super::model::CpProblemData;
use super::solver;

/// Name this scheduler registers under: `"choco"`, the default engine.
pub const NAME: &str = "choco";

/// Constraint-programming scheduler: builds the integer model in
/// [`CpProblemData`], searches it with [`solver::search`], and decodes each
/// improvement back to a `Project`.
pub struct CpScheduler {
    guard: ReentrancyGuard,
    estimator: Arc<dyn TimeEstimator>,
    symmetry_breaking: bool,
}

impl CpScheduler {
    pub fn new(estimator: Arc<dyn TimeEstimator>) -> Self {
        Self {
            guard: ReentrancyGuard::new(),
            estimator,
            symmetry_breaking: true,
        }
    }

    /// Toggles constraint 6 (symmetry breaking over interchangeable
    /// employees); on by default.
    pub fn with_symmetry_breaking(mut self, enabled: bool) -> Self {
        self.symmetry_breaking = enabled;
        self
    }
}

impl Scheduler for CpScheduler {
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
        let matrix = EstimationMatrix::new(project, self.estimator.as_ref());
        let data = CpProblemData::build(project, &matrix)?;
        let order = data.topological_order()?;
        let workers = parallel.resolve();

        let result = solver::search(&data, &order, time_limit, workers, self.symmetry_breaking, |slots| {
            let decoded = data.decode(project, slots);
            let solution = SchedulerSolution::new(decoded, false, start.elapsed()).with_stat("solver", "Choco Solver");
            on_progress(&solution);
        });

        let decoded = data.decode(project, &result.slots);
        Ok(SchedulerSolution::new(decoded, result.optimal, start.elapsed())
            .with_stat("solver", "Choco Solver")
            .with_stat("symmetryBreaking", self.symmetry_breaking)
            .with_stat("workers", workers as i64))
    }
}
