//! Configuration validation for the ruleflow rule workflow engine
//!
//! Every validator shares one contract: inspect a parsed
//! [`RuleEngineConfig`] and produce a [`ValidationResult`] of
//! structured issues with stable codes. The [`CompositeValidator`] runs
//! a chain of them in registration order, merges their findings, and
//! optionally short-circuits after the first validator that emits an
//! ERROR.
//!
//! The default chain checks what would make an execution fail outright:
//! reference integrity, reachability, and cycles. The strict chain adds
//! the per-action checks: duplicate action ids, condition syntax, and
//! circular variable dependencies.
//!
//! A validator that fails internally never aborts validation; its error
//! is converted to a `COMP-002` issue so the caller always receives a
//! complete result.

pub mod validators;

use ruleflow_domain::{Result, RuleEngineConfig, ValidationIssue, ValidationResult};
use tracing::warn;

pub use validators::circular_dependency::CircularDependencyValidator;
pub use validators::conditional::ConditionalActionValidator;
pub use validators::cycle::CycleDetector;
pub use validators::duplicate_action::DuplicateActionValidator;
pub use validators::reachability::ReachabilityValidator;
pub use validators::reference::ReferenceValidator;

/// Contract shared by all configuration validators
pub trait ConfigValidator: Send + Sync {
    /// Short validator name for diagnostics
    fn name(&self) -> &str;

    /// Inspect the configuration and report findings
    ///
    /// An `Err` is reserved for internal validator failures; the
    /// composite converts it to an issue instead of propagating.
    fn validate(&self, config: &RuleEngineConfig) -> Result<ValidationResult>;
}

/// Runs a chain of validators and merges their findings
pub struct CompositeValidator {
    validators: Vec<Box<dyn ConfigValidator>>,
    fail_fast: bool,
}

impl CompositeValidator {
    /// Create an empty composite
    pub fn new() -> Self {
        Self {
            validators: Vec::new(),
            fail_fast: false,
        }
    }

    /// The default chain: reference integrity, reachability, cycles
    pub fn standard() -> Self {
        Self::new()
            .with_validator(ReferenceValidator::new())
            .with_validator(ReachabilityValidator::new())
            .with_validator(CycleDetector::new())
    }

    /// The strict chain: the default chain plus duplicate-action,
    /// condition-syntax, and circular-dependency checks
    pub fn strict() -> Self {
        Self::standard()
            .with_validator(DuplicateActionValidator::new())
            .with_validator(ConditionalActionValidator::new())
            .with_validator(CircularDependencyValidator::new())
    }

    /// Append a validator to the chain (builder style)
    pub fn with_validator<V: ConfigValidator + 'static>(mut self, validator: V) -> Self {
        self.validators.push(Box::new(validator));
        self
    }

    /// Stop after the first validator that emits any ERROR
    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Run the chain and merge all findings
    pub fn validate(&self, config: &RuleEngineConfig) -> ValidationResult {
        let mut merged = ValidationResult::new();
        for validator in &self.validators {
            match validator.validate(config) {
                Ok(result) => {
                    let had_error = !result.is_valid();
                    merged.merge(result);
                    if self.fail_fast && had_error {
                        break;
                    }
                }
                Err(e) => {
                    warn!(
                        validator = validator.name(),
                        error = %e,
                        "validator failed internally"
                    );
                    merged.push(
                        ValidationIssue::error(
                            "COMP-002",
                            format!("validator '{}' failed: {e}", validator.name()),
                        )
                        .with_context(validator.name().to_string()),
                    );
                }
            }
        }
        merged
    }
}

impl Default for CompositeValidator {
    fn default() -> Self {
        Self::standard()
    }
}

impl ConfigValidator for CompositeValidator {
    fn name(&self) -> &str {
        "composite"
    }

    fn validate(&self, config: &RuleEngineConfig) -> Result<ValidationResult> {
        Ok(CompositeValidator::validate(self, config))
    }
}
