//! Memoizing cache in front of a [`TimeEstimator`].

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Duration;

use super::TimeEstimator;
use crate::error::ScheduleError;
use crate::model::{EmployeeId, Project, TaskId};

/// Lazy memo over `(EmployeeId, TaskId) -> Duration`. The underlying
/// estimator is invoked at most once per pair; concurrent callers (the CP
/// and GA engines both query this from worker threads) share one lock.
pub struct EstimationMatrix<'a> {
    project: &'a Project,
    estimator: &'a dyn TimeEstimator,
    cache: Mutex<HashMap<(EmployeeId, TaskId), Duration>>,
}

impl<'a> EstimationMatrix<'a> {
    pub fn new(project: &'a Project, estimator: &'a dyn TimeEstimator) -> Self {
        Self {
            project,
            estimator,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached duration, computing and storing it on first access.
    pub fn duration(&self, employee: EmployeeId, task: TaskId) -> Result<Duration, ScheduleError> {
        let key = (employee, task);
        if let Some(cached) = self.cache.lock().unwrap().get(&key) {
            return Ok(*cached);
        }

        let duration = self.estimator.estimate(self.project, employee, task)?;
        self.cache.lock().unwrap().insert(key, duration);
        Ok(duration)
    }
}
