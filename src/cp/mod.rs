//! Constraint-programming scheduler: the default engine.
//!
//! [`model`] builds the integer variable/constraint system (assignee, start,
//! duration, workload, makespan, priority cost) as an index-based mirror of
//! a [`crate::model::Project`]; [`solver`] runs a
//! branch-and-bound search over it, in single-worker or portfolio mode;
//! [`engine`] is the [`crate::scheduler::Scheduler`] implementation that
//! bridges the two and decodes each improvement back to a `Project`.

mod engine;
mod model;
mod solver;

pub use engine::{CpScheduler, NAME};
