//! Explicit duration-matrix estimator.

use chrono::Duration;

use super::TimeEstimator;
use crate::error::ScheduleError;
use crate::model::{EmployeeId, Project, TaskId};

/// A dense `|employees| x |tasks|` minute matrix, indexed by each project's
/// `all_employees()`/`all_tasks()` order. `estimate` is a direct lookup;
/// `skills_estimation` is not meaningful for this variant and always fails.
#[derive(Debug, Clone)]
pub struct MatrixEstimator {
    minutes: Vec<Vec<i64>>,
}

impl MatrixEstimator {
    pub fn new(minutes: Vec<Vec<i64>>) -> Self {
        Self { minutes }
    }
}

impl TimeEstimator for MatrixEstimator {
    fn estimate(
        &self,
        project: &Project,
        employee: EmployeeId,
        task: TaskId,
    ) -> Result<Duration, ScheduleError> {
        let e_idx = project
            .all_employees()
            .iter()
            .position(|e| e.id == employee)
            .ok_or(ScheduleError::UnknownEmployee { id: employee })?;
        let t_idx = project
            .all_tasks()
            .iter()
            .position(|t| t.id() == task)
            .ok_or(ScheduleError::UnknownTask { id: task })?;

        let minutes = self
            .minutes
            .get(e_idx)
            .and_then(|row| row.get(t_idx))
            .copied()
            .ok_or(ScheduleError::UnknownTask { id: task })?;
        Ok(Duration::minutes(minutes))
    }

    fn skills_estimation(&self, _emp_skills: &[i64], _task_skills: &[i64]) -> Result<Duration, ScheduleError> {
        Err(ScheduleError::validation(
            "MatrixEstimator.skillsEstimation",
            "the matrix estimator has no skill-based estimation, use estimate() instead",
        ))
    }
}
