//! Execution step and error records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Kind of event recorded in the execution history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepType {
    /// Traversal entered a rule
    RuleEntered,
    /// Traversal left a rule after its actions completed
    RuleExited,
    /// An action is about to run
    ActionStarted,
    /// An action finished successfully
    ActionCompleted,
    /// An action failed
    ActionFailed,
    /// A transition guard was evaluated
    TransitionEvaluated,
    /// An error was recorded on the context
    ErrorOccurred,
}

impl fmt::Display for StepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RuleEntered => write!(f, "RULE_ENTERED"),
            Self::RuleExited => write!(f, "RULE_EXITED"),
            Self::ActionStarted => write!(f, "ACTION_STARTED"),
            Self::ActionCompleted => write!(f, "ACTION_COMPLETED"),
            Self::ActionFailed => write!(f, "ACTION_FAILED"),
            Self::TransitionEvaluated => write!(f, "TRANSITION_EVALUATED"),
            Self::ErrorOccurred => write!(f, "ERROR_OCCURRED"),
        }
    }
}

/// One appended record in the execution history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionStep {
    /// Kind of event
    pub step_type: StepType,
    /// Rule the event belongs to, if any
    pub rule_id: Option<String>,
    /// Action the event belongs to, if any
    pub action_id: Option<String>,
    /// When the event was recorded
    pub timestamp: DateTime<Utc>,
    /// Elapsed time for completed/failed work
    pub duration_ms: Option<u64>,
    /// Free-form event details
    pub metadata: BTreeMap<String, String>,
}

impl ExecutionStep {
    /// Create a step of the given type with no rule or action attached
    pub fn new(step_type: StepType) -> Self {
        Self {
            step_type,
            rule_id: None,
            action_id: None,
            timestamp: Utc::now(),
            duration_ms: None,
            metadata: BTreeMap::new(),
        }
    }

    /// A RULE_ENTERED step for the given rule
    pub fn rule_entered<S: Into<String>>(rule_id: S) -> Self {
        Self::new(StepType::RuleEntered).with_rule(rule_id)
    }

    /// A RULE_EXITED step for the given rule
    pub fn rule_exited<S: Into<String>>(rule_id: S) -> Self {
        Self::new(StepType::RuleExited).with_rule(rule_id)
    }

    /// An ACTION_STARTED step for the given rule and action
    pub fn action_started<R: Into<String>, A: Into<String>>(rule_id: R, action_id: A) -> Self {
        Self::new(StepType::ActionStarted)
            .with_rule(rule_id)
            .with_action(action_id)
    }

    /// An ACTION_COMPLETED step for the given rule and action
    pub fn action_completed<R: Into<String>, A: Into<String>>(rule_id: R, action_id: A) -> Self {
        Self::new(StepType::ActionCompleted)
            .with_rule(rule_id)
            .with_action(action_id)
    }

    /// An ACTION_FAILED step for the given rule and action
    pub fn action_failed<R: Into<String>, A: Into<String>>(rule_id: R, action_id: A) -> Self {
        Self::new(StepType::ActionFailed)
            .with_rule(rule_id)
            .with_action(action_id)
    }

    /// A TRANSITION_EVALUATED step for the given rule
    pub fn transition_evaluated<S: Into<String>>(rule_id: S) -> Self {
        Self::new(StepType::TransitionEvaluated).with_rule(rule_id)
    }

    /// An ERROR_OCCURRED step for the given rule
    pub fn error_occurred<S: Into<String>>(rule_id: S) -> Self {
        Self::new(StepType::ErrorOccurred).with_rule(rule_id)
    }

    /// Attach a rule id
    pub fn with_rule<S: Into<String>>(mut self, rule_id: S) -> Self {
        self.rule_id = Some(rule_id.into());
        self
    }

    /// Attach an action id
    pub fn with_action<S: Into<String>>(mut self, action_id: S) -> Self {
        self.action_id = Some(action_id.into());
        self
    }

    /// Attach an elapsed duration in milliseconds
    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Attach one metadata entry
    pub fn with_metadata<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Details of the most recent failure, set on the context by the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Rule being executed when the failure occurred
    pub rule_id: String,
    /// Failed action, if the failure came from one
    pub action_id: Option<String>,
    /// Short taxonomy name, e.g. "ActionError"
    pub error_type: String,
    /// Human-readable failure message
    pub message: String,
    /// Underlying cause, if any
    pub cause: Option<String>,
    /// When the failure was recorded
    pub timestamp: DateTime<Utc>,
}

impl ErrorInfo {
    /// Create an error record for the given rule
    pub fn new<R: Into<String>, T: Into<String>, M: Into<String>>(
        rule_id: R,
        error_type: T,
        message: M,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            action_id: None,
            error_type: error_type.into(),
            message: message.into(),
            cause: None,
            timestamp: Utc::now(),
        }
    }

    /// Attach the failed action id
    pub fn with_action<S: Into<String>>(mut self, action_id: S) -> Self {
        self.action_id = Some(action_id.into());
        self
    }

    /// Attach an underlying cause description
    pub fn with_cause<S: Into<String>>(mut self, cause: S) -> Self {
        self.cause = Some(cause.into());
        self
    }
}
