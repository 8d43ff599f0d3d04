//! Error types for the scheduling core.
//!
//! A single [`ScheduleError`] enum covers every fallible operation in the
//! crate. `Project::validate` is the one exception: it reports *all*
//! detected invariant violations at once, so it returns
//! `Result<(), Vec<ScheduleError>>` rather than a single error.

use crate::model::{EmployeeId, TaskId};
use thiserror::Error;

/// The crate's single error type.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ScheduleError {
    /// Value-type construction or domain invariant failure.
    #[error("validation error at {path}: {message}")]
    ValidationError { path: String, message: String },

    /// Skill vectors of mismatched length were passed to a correlation estimator.
    #[error("mismatched skill set sizes: employee has {n_emp}, task has {n_task}")]
    IllegalSkillSets { n_emp: usize, n_task: usize },

    /// A skill vector shorter than 2 was passed to a correlation estimator.
    #[error("{kind} skill vector has only {size} entries, need at least 2")]
    IllegalNumSkills { kind: &'static str, size: usize },

    /// Reserved for parser collaborators (not constructed by this crate).
    #[error("invalid file format: {message}")]
    InvalidFileFormat { message: String },

    /// A scheduler instance was already running when called again.
    #[error("scheduler is already running")]
    SchedulerBusy,

    /// The registry has no solver registered under this name.
    #[error("unknown solver: {name}")]
    UnknownSolver { name: String },

    /// An estimation matrix was queried for an employee it doesn't know.
    #[error("unknown employee: {id}")]
    UnknownEmployee { id: EmployeeId },

    /// An estimation matrix was queried for a task it doesn't know.
    #[error("unknown task: {id}")]
    UnknownTask { id: TaskId },
}

impl ScheduleError {
    pub fn validation(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            path: path.into(),
            message: message.into(),
        }
    }
}
