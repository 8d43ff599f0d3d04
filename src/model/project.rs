//! Project aggregate: the employees and tasks to be scheduled, plus the
//! invariants that must hold before a project is handed to a scheduler.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{Employee, EmployeeId, ProjectId, Task, TaskId};
use crate::error::ScheduleError;

/// How far along a project's tasks are toward a full schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduledStatus {
    /// No task has been assigned yet.
    None,
    /// Some, but not all, tasks have been assigned.
    Partial,
    /// Every task has been assigned.
    Scheduled,
}

/// A project: a name, a kick-off instant, a roster of employees, and the
/// tasks to be distributed among them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    name: String,
    kick_off: DateTime<Utc>,
    employees: Vec<Employee>,
    tasks: Vec<Task>,
}

impl Project {
    pub fn new(
        name: impl Into<String>,
        kick_off: DateTime<Utc>,
        employees: Vec<Employee>,
        tasks: Vec<Task>,
    ) -> Result<Self, ScheduleError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ScheduleError::validation("Project.name", "project name must not be blank"));
        }
        Ok(Self {
            id: ProjectId::new(),
            name,
            kick_off,
            employees,
            tasks,
        })
    }

    pub fn with_id(id: ProjectId, mut self) -> Self {
        self.id = id;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kick_off(&self) -> DateTime<Utc> {
        self.kick_off
    }

    pub fn all_employees(&self) -> &[Employee] {
        &self.employees
    }

    pub fn all_tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Returns a project that is otherwise identical but carries `tasks`
    /// instead of its own. Used by schedulers to hand back a solved copy
    /// without mutating the input.
    pub fn with_tasks(&self, tasks: Vec<Task>) -> Self {
        Self {
            id: self.id,
            name: self.name.clone(),
            kick_off: self.kick_off,
            employees: self.employees.clone(),
            tasks,
        }
    }

    pub fn employee_by_id(&self, id: EmployeeId) -> Option<&Employee> {
        self.employees.iter().find(|e| e.id == id)
    }

    pub fn task_by_id(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id() == id)
    }

    pub fn scheduled_status(&self) -> ScheduledStatus {
        let assigned = self.tasks.iter().filter(|t| t.is_assigned()).count();
        if assigned == 0 {
            ScheduledStatus::None
        } else if assigned == self.tasks.len() {
            ScheduledStatus::Scheduled
        } else {
            ScheduledStatus::Partial
        }
    }

    /// The latest `endsAt` among assigned tasks, or the kick-off instant if
    /// none are assigned.
    pub fn ends_at(&self) -> DateTime<Utc> {
        self.tasks
            .iter()
            .filter_map(Task::ends_at)
            .max()
            .unwrap_or(self.kick_off)
    }

    /// The makespan: `ends_at - kick_off`.
    pub fn total_duration(&self) -> Duration {
        self.ends_at() - self.kick_off
    }

    /// Counts ordered pairs `(t1, t2)` of assigned tasks with
    /// `t1.startAt < t2.startAt` and `t1.priority.value > t2.priority.value`:
    /// a lower-priority task that started earlier than a higher-priority one.
    pub fn priority_cost(&self) -> u64 {
        let assigned: Vec<&Task> = self.tasks.iter().filter(|t| t.is_assigned()).collect();
        let mut cost = 0u64;
        for t1 in &assigned {
            for t2 in &assigned {
                if t1.start_at() < t2.start_at() && t1.priority() > t2.priority() {
                    cost += 1;
                }
            }
        }
        cost
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Checks every structural invariant, collecting *all* violations
    /// rather than stopping at the first one.
    pub fn validate(&self) -> Result<(), Vec<ScheduleError>> {
        let mut errors = Vec::new();

        if self.tasks.is_empty() {
            errors.push(ScheduleError::validation("Project.tasks", "project has no tasks"));
        }

        let mut seen_task_ids = HashSet::new();
        for task in &self.tasks {
            if !seen_task_ids.insert(task.id()) {
                errors.push(ScheduleError::validation(
                    "Project.tasks",
                    format!("duplicate task id {}", task.id()),
                ));
            }
        }

        let mut seen_employee_ids = HashSet::new();
        for employee in &self.employees {
            if !seen_employee_ids.insert(employee.id) {
                errors.push(ScheduleError::validation(
                    "Project.employees",
                    format!("duplicate employee id {}", employee.id),
                ));
            }
        }

        for task in &self.tasks {
            if let Some(dep) = task.depends_on() {
                if self.task_by_id(dep).is_none() {
                    errors.push(ScheduleError::validation(
                        "Task.dependsOn",
                        format!("task {} depends on unknown task {}", task.id(), dep),
                    ));
                }
            }
            if let Some(emp) = task.employee() {
                if self.employee_by_id(emp).is_none() {
                    errors.push(ScheduleError::validation(
                        "Task.employee",
                        format!("task {} is assigned to unknown employee {}", task.id(), emp),
                    ));
                }
            }
        }

        self.detect_cycles(&mut errors);
        self.detect_overlaps(&mut errors);
        self.detect_precedence_violations(&mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// A task's `dependsOn` is a single optional reference, so the
    /// precedence graph has out-degree at most one per node: a "functional
    /// graph", not a general multi-predecessor DAG. It can still contain
    /// cycles (e.g. `1 -> 5 -> 3 -> 1`), so a simple walk-and-mark suffices
    /// in place of a general DFS.
    fn detect_cycles(&self, errors: &mut Vec<ScheduleError>) {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Visiting,
            Done,
        }

        let mut marks: HashMap<TaskId, Mark> = HashMap::new();
        let mut reported: HashSet<TaskId> = HashSet::new();

        for start in &self.tasks {
            if marks.contains_key(&start.id()) {
                continue;
            }

            let mut path = Vec::new();
            let mut current = Some(start.id());

            while let Some(id) = current {
                match marks.get(&id) {
                    Some(Mark::Done) => break,
                    Some(Mark::Visiting) => {
                        if reported.insert(id) {
                            errors.push(ScheduleError::validation(
                                "Task.dependsOn",
                                format!("dependency cycle detected involving task {id}"),
                            ));
                        }
                        break;
                    }
                    None => {
                        marks.insert(id, Mark::Visiting);
                        path.push(id);
                        current = self.task_by_id(id).and_then(Task::depends_on);
                    }
                }
            }

            for id in path {
                marks.insert(id, Mark::Done);
            }
        }
    }

    fn detect_overlaps(&self, errors: &mut Vec<ScheduleError>) {
        let assigned: Vec<&Task> = self.tasks.iter().filter(|t| t.is_assigned()).collect();
        for (i, a) in assigned.iter().enumerate() {
            for b in &assigned[i + 1..] {
                if a.overlaps(b) {
                    errors.push(ScheduleError::validation(
                        "Task.startAt",
                        format!("tasks {} and {} overlap on the same employee", a.id(), b.id()),
                    ));
                }
            }
        }
    }

    /// An assigned task must end no later than any assigned task that
    /// depends on it starts.
    fn detect_precedence_violations(&self, errors: &mut Vec<ScheduleError>) {
        for task in &self.tasks {
            let (Some(dep_id), Some(start)) = (task.depends_on(), task.start_at()) else {
                continue;
            };
            let Some(dep) = self.task_by_id(dep_id) else {
                continue;
            };
            if let Some(dep_end) = dep.ends_at() {
                if dep_end > start {
                    errors.push(ScheduleError::validation(
                        "Task.startAt",
                        format!(
                            "task {} starts before its dependency {} finishes",
                            task.id(),
                            dep_id
                        ),
                    ));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskPriority;
    use std::collections::HashMap as Map;

    fn epoch() -> DateTime<Utc> {
        "2022-01-01T00:00:00Z".parse().unwrap()
    }

    fn task(name: &str) -> Task {
        Task::new(name, TaskPriority::Major, Map::new()).unwrap()
    }

    #[test]
    fn empty_tasks_is_invalid() {
        let p = Project::new("p", epoch(), vec![], vec![]).unwrap();
        assert!(!p.is_valid());
    }

    #[test]
    fn detects_self_cycle_through_chain() {
        let t1 = task("1");
        let t5 = task("5").with_dependency(t1.id());
        let t3 = task("3").with_dependency(t5.id());
        let t1 = t1.with_dependency(t3.id());

        let p = Project::new("p", epoch(), vec![], vec![t1, t5, t3]).unwrap();
        let errs = p.validate().unwrap_err();
        assert!(errs
            .iter()
            .any(|e| matches!(e, ScheduleError::ValidationError { message, .. } if message.contains("cycle"))));
    }

    #[test]
    fn detects_unknown_dependency() {
        let ghost = TaskId::new();
        let t = task("t").with_dependency(ghost);
        let p = Project::new("p", epoch(), vec![], vec![t]).unwrap();
        let errs = p.validate().unwrap_err();
        assert!(errs
            .iter()
            .any(|e| matches!(e, ScheduleError::ValidationError { message, .. } if message.contains("unknown task"))));
    }

    #[test]
    fn detects_overlap_on_same_employee() {
        let emp = Employee::new("ada", Map::new()).unwrap();
        let a = task("a").assign(emp.id, epoch(), Duration::minutes(30));
        let b = task("b").assign(emp.id, epoch() + Duration::minutes(10), Duration::minutes(30));
        let p = Project::new("p", epoch(), vec![emp], vec![a, b]).unwrap();
        assert!(!p.is_valid());
    }

    #[test]
    fn scheduled_status_tracks_assignment_progress() {
        let emp = Employee::new("ada", Map::new()).unwrap();
        let a = task("a");
        let b = task("b");
        let p0 = Project::new("p", epoch(), vec![emp.clone()], vec![a.clone(), b.clone()]).unwrap();
        assert_eq!(p0.scheduled_status(), ScheduledStatus::None);

        let a_assigned = a.assign(emp.id, epoch(), Duration::minutes(10));
        let p1 = p0.with_tasks(vec![a_assigned.clone(), b.clone()]);
        assert_eq!(p1.scheduled_status(), ScheduledStatus::Partial);

        let b_assigned = b.assign(emp.id, epoch() + Duration::minutes(10), Duration::minutes(10));
        let p2 = p0.with_tasks(vec![a_assigned, b_assigned]);
        assert_eq!(p2.scheduled_status(), ScheduledStatus::Scheduled);
    }

    #[test]
    fn priority_cost_counts_inversions_per_employee() {
        let emp = Employee::new("ada", Map::new()).unwrap();
        let critical = Task::new("c", TaskPriority::Critical, Map::new())
            .unwrap()
            .assign(emp.id, epoch() + Duration::minutes(30), Duration::minutes(10));
        let minor = Task::new("m", TaskPriority::Minor, Map::new())
            .unwrap()
            .assign(emp.id, epoch(), Duration::minutes(10));

        let p = Project::new("p", epoch(), vec![emp], vec![minor, critical]).unwrap();
        assert_eq!(p.priority_cost(), 1);
    }

    /// Domain types derive `serde::{Serialize, Deserialize}` precisely so an
    /// external DTO/persistence layer (out of scope for this crate, see
    /// spec.md §6) can round-trip a `Project` without a shim.
    #[test]
    fn project_round_trips_through_json() {
        let emp = Employee::new("ada", Map::from([("rust".to_string(), SkillPoint::new(7).unwrap())])).unwrap();
        let unassigned = task("plan");
        let assigned = task("build").assign(emp.id, epoch(), Duration::minutes(45));
        let project = Project::new("p", epoch(), vec![emp], vec![unassigned, assigned]).unwrap();

        let json = serde_json::to_string(&project).unwrap();
        let restored: Project = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, project);
        assert_eq!(restored.scheduled_status(), ScheduledStatus::Partial);
    }
}
