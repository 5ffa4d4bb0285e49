//! Action Port
//!
//! Defines the contract for units of work executed within a rule, and
//! for the factories that create them from configuration. Providers are
//! registered at build time and dispatched by descending priority; the
//! first provider whose `supports` matches an action's type tag
//! (case-insensitively) creates the action.

use crate::context::ExecutionContext;
use crate::error::Result;
use crate::model::ActionDefinition;
use crate::value_objects::Value;
use async_trait::async_trait;
use std::sync::Arc;

/// Outcome of one action execution
///
/// An action either succeeds with an optional payload (stored under the
/// action's `outputVariable` when one is configured) or fails with a
/// message and optional cause. Engine-level problems (expression
/// errors, I/O, ...) travel through the `Result` error channel instead.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionResult {
    /// The action completed
    Success {
        /// Value produced by the action, if any
        payload: Option<Value>,
    },
    /// The action ran but reported failure
    Failure {
        /// Description of the failure
        message: String,
        /// Underlying cause, if any
        cause: Option<String>,
    },
}

impl ActionResult {
    /// A successful result carrying a payload
    pub fn success<V: Into<Value>>(payload: V) -> Self {
        Self::Success {
            payload: Some(payload.into()),
        }
    }

    /// A successful result with no payload
    pub fn success_empty() -> Self {
        Self::Success { payload: None }
    }

    /// A failed result
    pub fn failure<S: Into<String>>(message: S) -> Self {
        Self::Failure {
            message: message.into(),
            cause: None,
        }
    }

    /// A failed result with an underlying cause
    pub fn failure_with_cause<M: Into<String>, C: Into<String>>(message: M, cause: C) -> Self {
        Self::Failure {
            message: message.into(),
            cause: Some(cause.into()),
        }
    }

    /// Whether this result is a success
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The success payload, if any
    pub fn payload(&self) -> Option<&Value> {
        match self {
            Self::Success { payload } => payload.as_ref(),
            Self::Failure { .. } => None,
        }
    }
}

/// A unit of work executed within a rule
///
/// Actions communicate exclusively through the execution context: they
/// read variables and resources, and their output is bound back into
/// the context by the engine.
#[async_trait]
pub trait Action: Send + Sync {
    /// Run the action against the context
    async fn execute(&self, ctx: &mut ExecutionContext) -> Result<ActionResult>;

    /// The type tag this action was created for
    fn action_type(&self) -> &str;

    /// The configured action id
    fn action_id(&self) -> &str;
}

/// Factory for actions of a given type tag
///
/// Registration happens during the build phase; dispatch afterwards is
/// read-only and safe to call concurrently.
pub trait ActionProvider: Send + Sync {
    /// Whether this provider handles the given type tag
    /// (case-insensitive)
    fn supports(&self, type_tag: &str) -> bool;

    /// Create an action from its definition
    ///
    /// Fails with an action-creation error when the definition is
    /// incomplete or invalid for this provider.
    fn create_action(&self, definition: &ActionDefinition) -> Result<Arc<dyn Action>>;

    /// Dispatch priority; higher values are consulted first
    fn priority(&self) -> i32 {
        0
    }

    /// A short identifier for diagnostics
    fn provider_name(&self) -> &str;
}

/// Shared action for dynamic dispatch
pub type SharedAction = Arc<dyn Action>;

/// Shared action provider for registry storage
pub type SharedActionProvider = Arc<dyn ActionProvider>;
