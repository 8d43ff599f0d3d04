//! Duration estimation: pluggable employee/task-pair duration estimators,
//! plus a memoizing cache in front of them.

mod cache;
mod matrix;
mod pearson;

pub use cache::EstimationMatrix;
pub use matrix::MatrixEstimator;
pub use pearson::PearsonEstimator;

use chrono::Duration;

use crate::error::ScheduleError;
use crate::model::{Employee, EmployeeId, Project, Task, TaskId};

/// Estimates how long a task will take a given employee.
pub trait TimeEstimator: Send + Sync {
    /// Estimated duration for `employee` doing `task` within `project`.
    ///
    /// The default implementation aligns both skill maps over the union of
    /// their keys (a key missing on one side contributes `0`) and delegates
    /// to [`skills_estimation`](Self::skills_estimation).
    fn estimate(
        &self,
        project: &Project,
        employee: EmployeeId,
        task: TaskId,
    ) -> Result<Duration, ScheduleError> {
        let emp = project
            .employee_by_id(employee)
            .ok_or(ScheduleError::UnknownEmployee { id: employee })?;
        let t = project
            .task_by_id(task)
            .ok_or(ScheduleError::UnknownTask { id: task })?;
        let (emp_vec, task_vec) = align_skills(emp, t);
        self.skills_estimation(&emp_vec, &task_vec)
    }

    /// Estimates a duration from two aligned integer skill vectors. Exposed
    /// directly so estimators can be exercised without constructing a
    /// project; both vectors must have length >= 2 and equal length.
    fn skills_estimation(
        &self,
        emp_skills: &[i64],
        task_skills: &[i64],
    ) -> Result<Duration, ScheduleError>;
}

fn align_skills(employee: &Employee, task: &Task) -> (Vec<i64>, Vec<i64>) {
    let mut keys: Vec<&String> = employee
        .skills()
        .keys()
        .chain(task.required_skills().keys())
        .collect();
    keys.sort();
    keys.dedup();

    let emp_vec = keys
        .iter()
        .map(|k| employee.skill_level(k).map(|s| s.value() as i64).unwrap_or(0))
        .collect();
    let task_vec = keys
        .iter()
        .map(|k| {
            task.required_skills()
                .get(k.as_str())
                .map(|s| s.value() as i64)
                .unwrap_or(0)
        })
        .collect();
    (emp_vec, task_vec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Employee, SkillPoint, Task, TaskPriority};
    use std::collections::HashMap;

    fn skills(pairs: &[(&str, u8)]) -> HashMap<String, SkillPoint> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), SkillPoint::new(*v).unwrap()))
            .collect()
    }

    #[test]
    fn align_skills_fills_missing_keys_with_zero() {
        let emp = Employee::new("ada", skills(&[("rust", 8), ("go", 3)])).unwrap();
        let task = Task::new("t", TaskPriority::Major, skills(&[("rust", 5)])).unwrap();
        let (emp_vec, task_vec) = align_skills(&emp, &task);
        assert_eq!(emp_vec.len(), 2);
        assert_eq!(task_vec.len(), 2);
        let sum_task: i64 = task_vec.iter().sum();
        assert_eq!(sum_task, 5, "the missing 'go' requirement contributes 0");
    }
}
