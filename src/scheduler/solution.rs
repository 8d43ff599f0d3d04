//! The value types a scheduler emits: one solution per improvement, and the
//! stats bag attached to it.

use std::collections::HashMap;
use std::time::Duration as WallClock;

use crate::model::Project;

/// A scalar in a solution's `stats` bag. `stats["solver"]` always names the
/// engine that produced the solution (see [`crate::registry`]).
#[derive(Debug, Clone, PartialEq)]
pub enum StatValue {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

impl From<i64> for StatValue {
    fn from(v: i64) -> Self {
        StatValue::Int(v)
    }
}

impl From<f64> for StatValue {
    fn from(v: f64) -> Self {
        StatValue::Float(v)
    }
}

impl From<&str> for StatValue {
    fn from(v: &str) -> Self {
        StatValue::Str(v.to_string())
    }
}

impl From<bool> for StatValue {
    fn from(v: bool) -> Self {
        StatValue::Bool(v)
    }
}

/// One snapshot emitted by a scheduler: either a strict improvement found
/// mid-search, or the final result.
#[derive(Debug, Clone)]
pub struct SchedulerSolution {
    pub project: Project,
    /// `true` only if the search proved this solution cannot be improved on.
    pub optimal: bool,
    /// Wall-clock elapsed since the search started.
    pub duration: WallClock,
    pub stats: HashMap<String, StatValue>,
}

impl SchedulerSolution {
    pub fn new(project: Project, optimal: bool, duration: WallClock) -> Self {
        Self {
            project,
            optimal,
            duration,
            stats: HashMap::new(),
        }
    }

    pub fn with_stat(mut self, key: impl Into<String>, value: impl Into<StatValue>) -> Self {
        self.stats.insert(key.into(), value.into());
        self
    }

    /// The `100*makespan_minutes + priorityCost` composite objective, lower
    /// is better. Makespan dominates; priority inversions break ties.
    ///
    /// Starves if `priorityCost >= 100`; callers targeting unusually large
    /// task counts should keep that in mind (see `OBJECTIVE_WEIGHT`).
    pub fn composite_objective(&self) -> i64 {
        composite_objective(&self.project)
    }
}

/// Fixed weight separating makespan from priority cost in the composite
/// objective. Kept as a named constant per the documented assumption that
/// `priorityCost < OBJECTIVE_WEIGHT` for realistic task counts.
pub const OBJECTIVE_WEIGHT: i64 = 100;

pub fn composite_objective(project: &Project) -> i64 {
    let makespan_minutes = project.total_duration().num_minutes();
    OBJECTIVE_WEIGHT * makespan_minutes + project.priority_cost() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Employee, SkillPoint, Task, TaskPriority};
    use chrono::Duration;
    use std::collections::HashMap as Map;

    #[test]
    fn composite_objective_weighs_makespan_over_priority_cost() {
        let emp = Employee::new("ada", Map::<String, SkillPoint>::new()).unwrap();
        let kick_off: chrono::DateTime<chrono::Utc> = "2022-01-01T00:00:00Z".parse().unwrap();

        let critical = Task::new("c", TaskPriority::Critical, Map::new())
            .unwrap()
            .assign(emp.id, kick_off + Duration::minutes(10), Duration::minutes(10));
        let minor = Task::new("m", TaskPriority::Minor, Map::new())
            .unwrap()
            .assign(emp.id, kick_off, Duration::minutes(10));

        let project = Project::new("p", kick_off, vec![emp], vec![minor, critical]).unwrap();
        assert_eq!(project.priority_cost(), 1);
        assert_eq!(project.total_duration(), Duration::minutes(20));
        assert_eq!(composite_objective(&project), 100 * 20 + 1);
    }
}
