//! Validation issue types
//!
//! Shared by every configuration validator: an issue has a severity, a
//! stable code (REF-001, CYCLE-001, ...), a message, and optional
//! context naming the rule or action involved. A result is valid iff it
//! carries no ERROR issue; warnings and infos never block a build.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity level for validation issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "ERROR"),
            Self::Warning => write!(f, "WARNING"),
            Self::Info => write!(f, "INFO"),
        }
    }
}

/// One finding produced by a configuration validator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// How blocking the finding is
    pub severity: Severity,
    /// Stable issue code, e.g. "REF-002"
    pub code: String,
    /// Human-readable description
    pub message: String,
    /// Rule/action/transition the finding refers to
    pub context: Option<String>,
}

impl ValidationIssue {
    /// Create an issue with the given severity
    pub fn new<C: Into<String>, M: Into<String>>(
        severity: Severity,
        code: C,
        message: M,
    ) -> Self {
        Self {
            severity,
            code: code.into(),
            message: message.into(),
            context: None,
        }
    }

    /// Create an ERROR issue
    pub fn error<C: Into<String>, M: Into<String>>(code: C, message: M) -> Self {
        Self::new(Severity::Error, code, message)
    }

    /// Create a WARNING issue
    pub fn warning<C: Into<String>, M: Into<String>>(code: C, message: M) -> Self {
        Self::new(Severity::Warning, code, message)
    }

    /// Create an INFO issue
    pub fn info<C: Into<String>, M: Into<String>>(code: C, message: M) -> Self {
        Self::new(Severity::Info, code, message)
    }

    /// Attach context naming the configuration element involved
    pub fn with_context<S: Into<String>>(mut self, context: S) -> Self {
        self.context = Some(context.into());
        self
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.code, self.message)?;
        if let Some(context) = &self.context {
            write!(f, " ({context})")?;
        }
        Ok(())
    }
}

/// Accumulated findings of one or more validators
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// All findings, in the order they were produced
    pub issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Create an empty (valid) result
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one finding
    pub fn push(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    /// Absorb all findings of another result
    pub fn merge(&mut self, other: ValidationResult) {
        self.issues.extend(other.issues);
    }

    /// Valid iff no ERROR issue is present
    pub fn is_valid(&self) -> bool {
        !self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    /// All ERROR issues
    pub fn errors(&self) -> Vec<&ValidationIssue> {
        self.by_severity(Severity::Error)
    }

    /// All WARNING issues
    pub fn warnings(&self) -> Vec<&ValidationIssue> {
        self.by_severity(Severity::Warning)
    }

    /// Number of ERROR issues
    pub fn error_count(&self) -> usize {
        self.errors().len()
    }

    /// Whether any finding at all was produced
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Whether a finding with the given code is present
    pub fn has_code(&self, code: &str) -> bool {
        self.issues.iter().any(|i| i.code == code)
    }

    fn by_severity(&self, severity: Severity) -> Vec<&ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == severity)
            .collect()
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} error(s), {} warning(s)",
            self.error_count(),
            self.warnings().len()
        )?;
        for issue in &self.issues {
            write!(f, "\n  {issue}")?;
        }
        Ok(())
    }
}
