//! Error handling types

use crate::validation::ValidationResult;
use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the rule workflow engine
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration parse or load error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error, including its origin
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// JSON parsing or serialization error
    #[error("JSON parsing error: {source}")]
    Json {
        /// The underlying JSON error
        #[from]
        source: serde_json::Error,
    },

    /// I/O operation error
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error
        #[from]
        source: std::io::Error,
    },

    /// Configuration validation produced blocking issues
    #[error("Configuration validation failed: {result}")]
    Validation {
        /// The issues found by the validators
        result: ValidationResult,
    },

    /// A provider could not instantiate an action from its definition
    #[error("Action creation error for type '{action_type}': {message}")]
    ActionCreation {
        /// The requested action type tag
        action_type: String,
        /// Description of the creation failure
        message: String,
    },

    /// Runtime action failure
    #[error("Action '{action_id}' failed: {message}")]
    Action {
        /// Identifier of the failed action
        action_id: String,
        /// Description of the failure
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Expression compile or evaluation failure
    #[error("Expression error in '{expression}': {message}")]
    Expression {
        /// The offending expression source text
        expression: String,
        /// Description of the failure
        message: String,
    },

    /// Terminal engine-level failure during rule traversal
    #[error("Rule execution error in rule '{rule_id}': {message}")]
    RuleExecution {
        /// The rule being executed when the failure occurred
        rule_id: String,
        /// Description of the failure
        message: String,
    },

    /// A typed accessor found a value of the wrong runtime type
    #[error("Type mismatch for '{context}': expected {expected}, found {actual}")]
    TypeMismatch {
        /// What was being accessed (variable name, expression, ...)
        context: String,
        /// The expected type name
        expected: String,
        /// The actual type name
        actual: String,
    },

    /// Wall-clock deadline exceeded
    #[error("Execution timed out after {timeout_ms}ms")]
    Timeout {
        /// The configured timeout in milliseconds
        timeout_ms: u64,
    },
}

impl Error {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with source
    pub fn configuration_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a validation error from a validator result
    pub fn validation(result: ValidationResult) -> Self {
        Self::Validation { result }
    }

    /// Create an action creation error
    pub fn action_creation<T: Into<String>, S: Into<String>>(action_type: T, message: S) -> Self {
        Self::ActionCreation {
            action_type: action_type.into(),
            message: message.into(),
        }
    }

    /// Create an action failure error
    pub fn action<I: Into<String>, S: Into<String>>(action_id: I, message: S) -> Self {
        Self::Action {
            action_id: action_id.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create an action failure error with source
    pub fn action_with_source<
        I: Into<String>,
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        action_id: I,
        message: S,
        source: E,
    ) -> Self {
        Self::Action {
            action_id: action_id.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an expression error
    pub fn expression<X: Into<String>, S: Into<String>>(expression: X, message: S) -> Self {
        Self::Expression {
            expression: expression.into(),
            message: message.into(),
        }
    }

    /// Create a rule execution error
    pub fn rule_execution<R: Into<String>, S: Into<String>>(rule_id: R, message: S) -> Self {
        Self::RuleExecution {
            rule_id: rule_id.into(),
            message: message.into(),
        }
    }

    /// Create a type mismatch error
    pub fn type_mismatch<C: Into<String>, E: Into<String>, A: Into<String>>(
        context: C,
        expected: E,
        actual: A,
    ) -> Self {
        Self::TypeMismatch {
            context: context.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(timeout_ms: u64) -> Self {
        Self::Timeout { timeout_ms }
    }

    /// The short taxonomy name of this error, used in [`crate::ErrorInfo`]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "ConfigurationError",
            Self::Json { .. } => "JsonError",
            Self::Io { .. } => "IoError",
            Self::Validation { .. } => "ValidationError",
            Self::ActionCreation { .. } => "ActionCreationError",
            Self::Action { .. } => "ActionError",
            Self::Expression { .. } => "ExpressionError",
            Self::RuleExecution { .. } => "RuleExecutionError",
            Self::TypeMismatch { .. } => "TypeMismatchError",
            Self::Timeout { .. } => "TimeoutError",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message_format() {
        let error = Error::timeout(50);
        assert_eq!(format!("{error}"), "Execution timed out after 50ms");
    }

    #[test]
    fn test_action_error_carries_id() {
        let error = Error::action("fetch-user", "boom");
        match &error {
            Error::Action { action_id, .. } => assert_eq!(action_id, "fetch-user"),
            other => panic!("expected Action error, got {other:?}"),
        }
        assert_eq!(error.error_type(), "ActionError");
    }

    #[test]
    fn test_expression_error_carries_source_text() {
        let error = Error::expression("a +* b", "unexpected token");
        let display = format!("{error}");
        assert!(display.contains("a +* b"));
        assert!(display.contains("unexpected token"));
    }
}
