//! Ordered record of a search's improving solutions.

use super::solution::SchedulerSolution;

/// The solutions a single `collect_all_optimal_schedules` call produced, in
/// arrival order. Each entry strictly improves on the previous by composite
/// objective.
#[derive(Debug, Clone, Default)]
pub struct SolutionHistory {
    solutions: Vec<SchedulerSolution>,
}

impl SolutionHistory {
    pub fn new() -> Self {
        Self {
            solutions: Vec::new(),
        }
    }

    /// Appends `solution`. Callers (the CP/GA engines) are responsible for
    /// only calling this with solutions that strictly improve on the last
    /// recorded one; this keeps that invariant as a debug assertion rather
    /// than silently filtering, since a violation means the engine itself
    /// is broken.
    pub fn push(&mut self, solution: SchedulerSolution) {
        if let Some(last) = self.solutions.last() {
            debug_assert!(
                solution.composite_objective() < last.composite_objective(),
                "solution history must strictly improve: {} is not < {}",
                solution.composite_objective(),
                last.composite_objective()
            );
        }
        self.solutions.push(solution);
    }

    pub fn solutions(&self) -> &[SchedulerSolution] {
        &self.solutions
    }

    pub fn last(&self) -> Option<&SchedulerSolution> {
        self.solutions.last()
    }

    pub fn last_project(&self) -> Option<&crate::model::Project> {
        self.solutions.last().map(|s| &s.project)
    }

    pub fn len(&self) -> usize {
        self.solutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solutions.is_empty()
    }
}
