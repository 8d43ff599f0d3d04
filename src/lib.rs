//! Resource-constrained project scheduling with employee/task assignment.
//!
//! Given a [`model::Project`] — employees with skill vectors, tasks with
//! required-skill vectors, priorities and precedence links, plus an
//! optional set of pre-pinned assignments — a [`scheduler::Scheduler`]
//! assigns every task to exactly one employee with a concrete start and
//! duration, minimizing makespan first and priority inversions second.
//!
//! # Modules
//!
//! - [`model`]: the immutable employee/task/project data model and its
//!   validation invariants (cycle detection, overlap detection, precedence).
//! - [`estimator`]: the `TimeEstimator` trait (skill-correlation and
//!   explicit-matrix variants) and its memoizing cache.
//! - [`cp`]: the constraint-programming engine — an integer model plus a
//!   branch-and-bound search run single- or multi-threaded, the default
//!   (`"choco"`) scheduler.
//! - [`ga`]: the permutation-genetic alternate engine (`"jenetics"`) and its
//!   greedy earliest-finish-time decoder.
//! - [`scheduler`]: the abstract `Scheduler` contract — re-entrancy guard,
//!   anytime progress callback, and the `SolutionHistory` it accumulates.
//! - [`registry`]: the `name -> descriptor` map exposing both engines under
//!   a uniform contract.
//! - [`error`]: the crate's single error type.
//!
//! File parsers, dashboard rendering, CLI argument handling, and
//! serialization DTOs are out of scope: they are external collaborators
//! that talk to this crate only through `Project` and
//! `SchedulerSolution`/`SolutionHistory`.

pub mod cp;
pub mod error;
pub mod estimator;
pub mod ga;
pub mod model;
pub mod registry;
pub mod scheduler;

pub use error::ScheduleError;
