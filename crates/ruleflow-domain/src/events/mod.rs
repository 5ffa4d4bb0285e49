//! Execution events
//!
//! Append-only records produced while a workflow runs: one
//! [`ExecutionStep`] per engine event and at most one [`ErrorInfo`] for
//! the most recent failure. The trace layer derives all of its
//! aggregates as pure folds over the step history.

pub mod execution_steps;

pub use execution_steps::{ErrorInfo, ExecutionStep, StepType};
