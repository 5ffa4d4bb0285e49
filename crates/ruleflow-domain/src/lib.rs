//! Domain layer for the ruleflow rule workflow engine
//!
//! This crate holds the types every other layer builds on:
//!
//! - The static configuration model ([`model`]): rules, actions,
//!   transitions, and global settings parsed from a JSON document.
//! - The dynamic [`Value`] sum type carried through an execution.
//! - The mutable [`ExecutionContext`] owned by one `execute` call.
//! - Execution events ([`events`]): the append-only step history and
//!   error records.
//! - Validation issue types ([`validation`]) shared by all
//!   configuration validators.
//! - The action ports ([`ports`]): the contracts custom action
//!   providers implement.
//!
//! The domain crate has no knowledge of the expression language, the
//! provider registry, or the executor; those live in their own crates
//! and depend on this one.

pub mod context;
pub mod error;
pub mod events;
pub mod model;
pub mod ports;
pub mod validation;
pub mod value_objects;

pub use context::{Deadline, ExecutionContext};
pub use error::{Error, Result};
pub use events::{ErrorInfo, ExecutionStep, StepType};
pub use model::{
    ActionDefinition, ErrorHandlerDefinition, GlobalSettings, RuleDefinition, RuleEngineConfig,
    TransitionDefinition,
};
pub use ports::{Action, ActionProvider, ActionResult, SharedAction, SharedActionProvider};
pub use validation::{Severity, ValidationIssue, ValidationResult};
pub use value_objects::{FromValue, Value};
