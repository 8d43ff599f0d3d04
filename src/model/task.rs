//! Task model: priority, the unassigned/assigned sum type, and its
//! constructors.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{EmployeeId, SkillPoint, TaskId};
use crate::error::ScheduleError;

/// Scheduling priority. Lower numeric value is higher priority:
/// `CRITICAL (1) < MAJOR (2) < MINOR (3)`. A task with a smaller value must
/// not start after a task with a larger value without incurring a priority
/// inversion (see [`crate::model::Project::priority_cost`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TaskPriority {
    Critical,
    Major,
    Minor,
}

impl TaskPriority {
    /// The wire ordinal: `CRITICAL=1, MAJOR=2, MINOR=3`.
    pub fn value(&self) -> u8 {
        match self {
            TaskPriority::Critical => 1,
            TaskPriority::Major => 2,
            TaskPriority::Minor => 3,
        }
    }
}

/// Fields shared by both task variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskBase {
    pub id: TaskId,
    description: String,
    pub priority: TaskPriority,
    required_skills: HashMap<String, SkillPoint>,
    depends_on: Option<TaskId>,
}

/// A task to be scheduled: either still `Unassigned`, or `Assigned` to an
/// employee with a concrete start time and duration.
///
/// Modelled as a sealed sum rather than an inheritance hierarchy: callers
/// pattern-match instead of downcasting, and an `Unassigned` task can never
/// carry a dangling `startAt`/`duration`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Task {
    Unassigned(TaskBase),
    Assigned {
        base: TaskBase,
        employee: EmployeeId,
        start_at: DateTime<Utc>,
        duration_minutes: i64,
        pinned: bool,
    },
}

impl Task {
    /// Creates a new, unassigned task. Fails if `description` is blank.
    pub fn new(
        description: impl Into<String>,
        priority: TaskPriority,
        required_skills: HashMap<String, SkillPoint>,
    ) -> Result<Self, ScheduleError> {
        let description = description.into();
        if description.trim().is_empty() {
            return Err(ScheduleError::validation(
                "Task.description",
                "task description must not be blank",
            ));
        }
        Ok(Task::Unassigned(TaskBase {
            id: TaskId::new(),
            description,
            priority,
            required_skills,
            depends_on: None,
        }))
    }

    fn base(&self) -> &TaskBase {
        match self {
            Task::Unassigned(base) => base,
            Task::Assigned { base, .. } => base,
        }
    }

    fn base_mut(&mut self) -> &mut TaskBase {
        match self {
            Task::Unassigned(base) => base,
            Task::Assigned { base, .. } => base,
        }
    }

    pub fn id(&self) -> TaskId {
        self.base().id
    }

    pub fn description(&self) -> &str {
        &self.base().description
    }

    pub fn priority(&self) -> TaskPriority {
        self.base().priority
    }

    pub fn required_skills(&self) -> &HashMap<String, SkillPoint> {
        &self.base().required_skills
    }

    pub fn depends_on(&self) -> Option<TaskId> {
        self.base().depends_on
    }

    pub fn is_assigned(&self) -> bool {
        matches!(self, Task::Assigned { .. })
    }

    pub fn employee(&self) -> Option<EmployeeId> {
        match self {
            Task::Assigned { employee, .. } => Some(*employee),
            Task::Unassigned(_) => None,
        }
    }

    pub fn pinned(&self) -> bool {
        matches!(self, Task::Assigned { pinned: true, .. })
    }

    pub fn start_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Task::Assigned { start_at, .. } => Some(*start_at),
            Task::Unassigned(_) => None,
        }
    }

    pub fn duration(&self) -> Option<Duration> {
        match self {
            Task::Assigned {
                duration_minutes, ..
            } => Some(Duration::minutes(*duration_minutes)),
            Task::Unassigned(_) => None,
        }
    }

    /// `endsAt = startAt + duration`, or `None` if unassigned.
    pub fn ends_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Task::Assigned {
                start_at,
                duration_minutes,
                ..
            } => Some(*start_at + Duration::minutes(*duration_minutes)),
            Task::Unassigned(_) => None,
        }
    }

    /// Returns a new `AssignedTask` for this task's base.
    pub fn assign(&self, employee: EmployeeId, start_at: DateTime<Utc>, duration: Duration) -> Self {
        Task::Assigned {
            base: self.base().clone(),
            employee,
            start_at,
            duration_minutes: duration.num_minutes(),
            pinned: false,
        }
    }

    /// Returns a new `AssignedTask`, marked pinned (kept verbatim by schedulers).
    pub fn assign_pinned(
        &self,
        employee: EmployeeId,
        start_at: DateTime<Utc>,
        duration: Duration,
    ) -> Self {
        Task::Assigned {
            base: self.base().clone(),
            employee,
            start_at,
            duration_minutes: duration.num_minutes(),
            pinned: true,
        }
    }

    /// Returns a new `UnassignedTask` for this task's base.
    pub fn unassign(&self) -> Self {
        Task::Unassigned(self.base().clone())
    }

    /// Returns a new task with `dependsOn` replaced.
    pub fn change_dependency(&self, new_dependency: Option<TaskId>) -> Self {
        let mut clone = self.clone();
        clone.base_mut().depends_on = new_dependency;
        clone
    }

    /// Builder-style setter, used when constructing a project's task graph.
    pub fn with_dependency(mut self, dependency: TaskId) -> Self {
        self.base_mut().depends_on = Some(dependency);
        self
    }

    /// Whether this assigned task overlaps `other`: both assigned, sharing
    /// an employee, with intersecting half-open `[startAt, endsAt)` intervals.
    pub fn overlaps(&self, other: &Task) -> bool {
        let (Some(a_emp), Some(b_emp)) = (self.employee(), other.employee()) else {
            return false;
        };
        if a_emp != b_emp {
            return false;
        }
        let (Some(a_start), Some(a_end), Some(b_start), Some(b_end)) =
            (self.start_at(), self.ends_at(), other.start_at(), other.ends_at())
        else {
            return false;
        };
        a_start < b_end && b_start < a_end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn epoch() -> DateTime<Utc> {
        "2022-01-01T00:00:00Z".parse().unwrap()
    }

    #[test]
    fn rejects_blank_description() {
        assert!(Task::new("", TaskPriority::Major, HashMap::new()).is_err());
    }

    #[test]
    fn priority_ordinals_match_wire_contract() {
        assert_eq!(TaskPriority::Critical.value(), 1);
        assert_eq!(TaskPriority::Major.value(), 2);
        assert_eq!(TaskPriority::Minor.value(), 3);
        assert!(TaskPriority::Critical < TaskPriority::Major);
        assert!(TaskPriority::Major < TaskPriority::Minor);
    }

    #[test]
    fn assign_and_unassign_round_trip() {
        let task = Task::new("write report", TaskPriority::Minor, HashMap::new()).unwrap();
        let emp = EmployeeId::new();
        let assigned = task.assign(emp, epoch(), Duration::minutes(30));
        assert!(assigned.is_assigned());
        assert_eq!(assigned.ends_at(), Some(epoch() + Duration::minutes(30)));
        assert_eq!(assigned.id(), task.id());

        let back = assigned.unassign();
        assert!(!back.is_assigned());
        assert_eq!(back.id(), task.id());
    }

    #[test]
    fn overlap_requires_same_employee_and_intersecting_interval() {
        let task = Task::new("t", TaskPriority::Major, HashMap::new()).unwrap();
        let e1 = EmployeeId::new();
        let e2 = EmployeeId::new();

        let a = task.assign(e1, epoch(), Duration::minutes(10));
        let b = task.assign(e1, epoch() + Duration::minutes(5), Duration::minutes(10));
        let c = task.assign(e1, epoch() + Duration::minutes(10), Duration::minutes(10));
        let d = task.assign(e2, epoch() + Duration::minutes(5), Duration::minutes(10));

        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c), "half-open interval: touching is not overlapping");
        assert!(!a.overlaps(&d), "different employees never overlap");
    }

    #[test]
    fn change_dependency_preserves_identity() {
        let a = Task::new("a", TaskPriority::Major, HashMap::new()).unwrap();
        let b = Task::new("b", TaskPriority::Major, HashMap::new()).unwrap();
        let b2 = b.change_dependency(Some(a.id()));
        assert_eq!(b2.id(), b.id());
        assert_eq!(b2.depends_on(), Some(a.id()));
    }
}
