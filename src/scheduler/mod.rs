//! The scheduler contract: re-entrancy guard, anytime progress callback, and
//! the `SolutionHistory` both are recorded into.

mod guard;
mod history;
mod solution;

pub use guard::{GuardHandle, ReentrancyGuard};
pub use history::SolutionHistory;
pub use solution::{composite_objective, SchedulerSolution, StatValue, OBJECTIVE_WEIGHT};

use std::sync::Mutex;
use std::time::Duration as WallClock;

use crate::error::ScheduleError;
use crate::model::Project;

/// How many workers a scheduler should spread its search across.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parallelism {
    /// `max(1, floor(0.9 * logical_cores))`.
    Auto,
    Workers(usize),
}

impl Parallelism {
    /// Maps the wire convention (`-1` => auto, `n>=1` => n workers) onto
    /// [`Parallelism`].
    pub fn from_arg(n: i64) -> Self {
        if n <= 0 {
            Parallelism::Auto
        } else {
            Parallelism::Workers(n as usize)
        }
    }

    pub fn resolve(self) -> usize {
        match self {
            Parallelism::Auto => {
                let cores = std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1);
                ((cores as f64) * 0.9).floor().max(1.0) as usize
            }
            Parallelism::Workers(n) => n.max(1),
        }
    }
}

/// An anytime scheduler: given a project, streams strictly-improving
/// solutions to a callback and returns their full history.
///
/// Implementors provide [`solve_optimization_problem`](Scheduler::solve_optimization_problem);
/// the re-entrancy guard and history bookkeeping are handled once, here, by
/// the default [`collect_all_optimal_schedules`](Scheduler::collect_all_optimal_schedules).
pub trait Scheduler: Send + Sync {
    fn name(&self) -> &str;

    /// The instance's re-entrancy guard. A fresh scheduler starts `IDLE`.
    fn guard(&self) -> &ReentrancyGuard;

    /// Runs the actual search. Implementations call `on_progress` once per
    /// strict improvement (including, typically, the final one) and return
    /// that same final solution.
    fn solve_optimization_problem(
        &self,
        project: &Project,
        time_limit: WallClock,
        parallel: Parallelism,
        on_progress: &mut (dyn FnMut(&SchedulerSolution) + Send),
    ) -> Result<SchedulerSolution, ScheduleError>;

    /// Acquires the re-entrancy guard, runs the search, and returns the full
    /// [`SolutionHistory`]. Fails immediately with [`ScheduleError::SchedulerBusy`]
    /// if another call on this instance is already running; the guard is
    /// released on every exit path via [`GuardHandle`]'s `Drop`.
    fn collect_all_optimal_schedules(
        &self,
        project: &Project,
        time_limit: WallClock,
        parallel: Parallelism,
        on_progress: &mut (dyn FnMut(&SchedulerSolution) + Send),
    ) -> Result<SolutionHistory, ScheduleError> {
        let _guard = self.guard().acquire()?;
        tracing::info!(solver = self.name(), "starting search");

        let history = Mutex::new(SolutionHistory::new());
        let result = {
            let history_ref = &history;
            let mut forward = move |solution: &SchedulerSolution| {
                tracing::debug!(
                    objective = solution.composite_objective(),
                    optimal = solution.optimal,
                    "improving solution"
                );
                history_ref.lock().unwrap().push(solution.clone());
                on_progress(solution);
            };
            self.solve_optimization_problem(project, time_limit, parallel, &mut forward)
        };

        let final_solution = result?;
        {
            let mut h = history.lock().unwrap();
            let should_push = match h.last() {
                None => true,
                Some(last) => final_solution.composite_objective() < last.composite_objective(),
            };
            if should_push {
                h.push(final_solution);
            }
        }
        let history = history.into_inner().unwrap();
        tracing::info!(solver = self.name(), solutions = history.len(), "search finished");
        Ok(history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Employee, SkillPoint, Task, TaskPriority};
    use std::collections::HashMap as Map;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    struct OneShotScheduler {
        guard: ReentrancyGuard,
        inner_calls: AtomicUsize,
    }

    impl OneShotScheduler {
        fn new() -> Self {
            Self {
                guard: ReentrancyGuard::new(),
                inner_calls: AtomicUsize::new(0),
            }
        }

        fn base_project() -> Project {
            let emp = Employee::new("ada", Map::<String, SkillPoint>::new()).unwrap();
            let kick_off: chrono::DateTime<chrono::Utc> = "2022-01-01T00:00:00Z".parse().unwrap();
            let task = Task::new("t", TaskPriority::Major, Map::new())
                .unwrap()
                .assign(emp.id, kick_off, chrono::Duration::minutes(10));
            Project::new("p", kick_off, vec![emp], vec![task]).unwrap()
        }
    }

    impl Scheduler for OneShotScheduler {
        fn name(&self) -> &str {
            "one-shot"
        }

        fn guard(&self) -> &ReentrancyGuard {
            &self.guard
        }

        fn solve_optimization_problem(
            &self,
            project: &Project,
            _time_limit: WallClock,
            _parallel: Parallelism,
            on_progress: &mut (dyn FnMut(&SchedulerSolution) + Send),
        ) -> Result<SchedulerSolution, ScheduleError> {
            self.inner_calls.fetch_add(1, Ordering::SeqCst);
            thread::sleep(std::time::Duration::from_millis(10));
            let solution = SchedulerSolution::new(project.clone(), true, WallClock::from_millis(10));
            on_progress(&solution);
            Ok(solution)
        }
    }

    #[test]
    fn history_contains_the_emitted_solution() {
        let scheduler = OneShotScheduler::new();
        let project = OneShotScheduler::base_project();
        let mut seen = Vec::new();
        let history = scheduler
            .collect_all_optimal_schedules(
                &project,
                WallClock::from_secs(1),
                Parallelism::Auto,
                &mut |s| seen.push(s.optimal),
            )
            .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(seen, vec![true]);
        assert!(history.last_project().is_some());
    }

    #[test]
    fn exactly_one_of_n_concurrent_calls_succeeds_and_inner_solve_runs_once() {
        let scheduler = Arc::new(OneShotScheduler::new());
        let project = OneShotScheduler::base_project();
        let successes = Arc::new(AtomicUsize::new(0));
        let busy = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..100)
            .map(|_| {
                let scheduler = Arc::clone(&scheduler);
                let project = project.clone();
                let successes = Arc::clone(&successes);
                let busy = Arc::clone(&busy);
                thread::spawn(move || {
                    let result = scheduler.collect_all_optimal_schedules(
                        &project,
                        WallClock::from_secs(1),
                        Parallelism::Auto,
                        &mut |_| {},
                    );
                    match result {
                        Ok(_) => {
                            successes.fetch_add(1, Ordering::SeqCst);
                        }
                        Err(ScheduleError::SchedulerBusy) => {
                            busy.fetch_add(1, Ordering::SeqCst);
                        }
                        Err(other) => panic!("unexpected error: {other:?}"),
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(successes.load(Ordering::SeqCst), 1);
        assert_eq!(busy.load(Ordering::SeqCst), 99);
        assert_eq!(scheduler.inner_calls.load(Ordering::SeqCst), 1);

        assert!(scheduler
            .collect_all_optimal_schedules(&project, WallClock::from_secs(1), Parallelism::Auto, &mut |_| {})
            .is_ok());
    }
}
