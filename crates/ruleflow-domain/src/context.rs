//! Mutable execution context
//!
//! The context is the sole channel by which actions communicate: a
//! mutable key/value variable map, a read-only resource map supplied by
//! the host, the append-only step history, and the bookkeeping the
//! engine maintains while traversing rules.
//!
//! A context is created by the caller, owned by exactly one `execute`
//! invocation, and must not be shared across concurrent executions. The
//! exclusive borrow taken by the executor encodes that contract in the
//! type system; distinct contexts can run concurrently against the same
//! executor.

use crate::error::{Error, Result};
use crate::events::{ErrorInfo, ExecutionStep};
use crate::value_objects::{FromValue, Value};
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

/// Wall-clock bound for the running execution
///
/// Set by the executor before traversal starts. CPU-bound expression
/// loops poll it between iterations so a run can be abandoned
/// cooperatively when the async timer cannot preempt it.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    /// Instant after which the run is considered timed out
    pub at: Instant,
    /// The configured timeout, kept for the failure message
    pub timeout_ms: u64,
}

impl Deadline {
    /// A deadline `timeout_ms` milliseconds from now
    pub fn from_timeout_ms(timeout_ms: u64) -> Self {
        Self {
            at: Instant::now() + std::time::Duration::from_millis(timeout_ms),
            timeout_ms,
        }
    }

    /// Whether the deadline has passed
    pub fn exceeded(&self) -> bool {
        Instant::now() >= self.at
    }
}

/// Mutable state carried through one workflow execution
#[derive(Default)]
pub struct ExecutionContext {
    /// Workflow variables; keys are unique, values heterogeneous
    pub variables: HashMap<String, Value>,
    /// Host-provided resources, read-only to actions
    pub resources: HashMap<String, Arc<dyn Any + Send + Sync>>,
    /// Append-only execution step history
    pub history: Vec<ExecutionStep>,
    /// Rule currently being executed
    pub current_rule_id: Option<String>,
    /// Number of rule entries so far
    pub depth: u32,
    /// Most recent failure, if any
    pub error: Option<ErrorInfo>,
    /// Whether the engine should aggregate a trace for this run
    pub trace_enabled: bool,
    /// Cooperative cancellation checkpoint set by the executor
    pub deadline: Option<Deadline>,
}

impl ExecutionContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed one variable (builder style)
    pub fn with_variable<K: Into<String>, V: Into<Value>>(mut self, key: K, value: V) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    /// Seed several variables (builder style)
    pub fn with_variables<I, K, V>(mut self, variables: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        for (key, value) in variables {
            self.variables.insert(key.into(), value.into());
        }
        self
    }

    /// Enable trace aggregation for this run (builder style)
    pub fn with_trace(mut self) -> Self {
        self.trace_enabled = true;
        self
    }

    /// Set a variable, replacing any previous value
    pub fn set_variable<K: Into<String>, V: Into<Value>>(&mut self, key: K, value: V) {
        self.variables.insert(key.into(), value.into());
    }

    /// Read a variable
    pub fn get_variable(&self, key: &str) -> Option<&Value> {
        self.variables.get(key)
    }

    /// Read a variable, cloning it, with `Null` for absent keys
    pub fn variable_or_null(&self, key: &str) -> Value {
        self.variables.get(key).cloned().unwrap_or(Value::Null)
    }

    /// Whether a variable exists
    pub fn has_variable(&self, key: &str) -> bool {
        self.variables.contains_key(key)
    }

    /// Remove a variable, returning its previous value
    pub fn remove_variable(&mut self, key: &str) -> Option<Value> {
        self.variables.remove(key)
    }

    /// Read a variable converted to a concrete type
    ///
    /// Absent keys and explicit nulls read as `None`; a present value of
    /// the wrong runtime type is a type-mismatch error.
    pub fn get_variable_as<T: FromValue>(&self, key: &str) -> Result<Option<T>> {
        match self.variables.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => T::from_value(value).map(Some).ok_or_else(|| {
                Error::type_mismatch(key, T::TYPE_NAME, value.type_name())
            }),
        }
    }

    /// Attach a host resource
    pub fn set_resource<K: Into<String>>(&mut self, key: K, resource: Arc<dyn Any + Send + Sync>) {
        self.resources.insert(key.into(), resource);
    }

    /// Read a host resource downcast to a concrete type
    pub fn resource<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        self.resources
            .get(key)
            .and_then(|r| Arc::clone(r).downcast::<T>().ok())
    }

    /// Append a step to the execution history
    pub fn record_step(&mut self, step: ExecutionStep) {
        self.history.push(step);
    }

    /// Record a failure on the context
    pub fn set_error(&mut self, error: ErrorInfo) {
        self.error = Some(error);
    }

    /// Take the recorded failure, clearing the slot
    pub fn take_error(&mut self) -> Option<ErrorInfo> {
        self.error.take()
    }

    /// Whether the cooperative deadline has passed
    ///
    /// Long-running expression loops call this between iterations so a
    /// CPU-bound script can be abandoned when the run times out.
    pub fn deadline_exceeded(&self) -> bool {
        self.deadline.is_some_and(|deadline| deadline.exceeded())
    }
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Resources are opaque; print their keys only
        f.debug_struct("ExecutionContext")
            .field("variables", &self.variables)
            .field("resources", &self.resources.keys().collect::<Vec<_>>())
            .field("history_len", &self.history.len())
            .field("current_rule_id", &self.current_rule_id)
            .field("depth", &self.depth)
            .field("error", &self.error)
            .field("trace_enabled", &self.trace_enabled)
            .finish()
    }
}
