//! Reference integrity validator
//!
//! Checks that every id mentioned anywhere in the configuration names a
//! rule that actually exists: the entry point, transition targets,
//! action-level error handlers, and the global default error rule. Also
//! warns about non-terminal rules with no way out.

use crate::ConfigValidator;
use ruleflow_domain::{Result, RuleEngineConfig, ValidationIssue, ValidationResult};
use std::collections::HashSet;

/// Validates reference integrity (codes REF-001..REF-010)
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceValidator;

impl ReferenceValidator {
    /// Create a new reference validator
    pub fn new() -> Self {
        Self
    }
}

impl ConfigValidator for ReferenceValidator {
    fn name(&self) -> &str {
        "reference"
    }

    fn validate(&self, config: &RuleEngineConfig) -> Result<ValidationResult> {
        let mut result = ValidationResult::new();

        if config.entry_point.trim().is_empty() {
            result.push(ValidationIssue::error(
                "REF-001",
                "entry point is missing or empty",
            ));
        } else if !config.has_rule(&config.entry_point) {
            result.push(
                ValidationIssue::error(
                    "REF-002",
                    format!("entry point '{}' does not name a rule", config.entry_point),
                )
                .with_context(format!("entryPoint '{}'", config.entry_point)),
            );
        }

        if config.rules.is_empty() {
            result.push(ValidationIssue::error("REF-003", "no rules defined"));
        }

        let mut seen_ids: HashSet<&str> = HashSet::new();
        for rule in &config.rules {
            if !seen_ids.insert(rule.rule_id.as_str()) {
                result.push(
                    ValidationIssue::error(
                        "REF-004",
                        format!("duplicate rule id '{}'", rule.rule_id),
                    )
                    .with_context(format!("rule '{}'", rule.rule_id)),
                );
            }
        }

        for rule in &config.rules {
            let rule_context = format!("rule '{}'", rule.rule_id);

            for (index, transition) in rule.transitions.iter().enumerate() {
                if transition.condition.trim().is_empty() {
                    result.push(
                        ValidationIssue::error(
                            "REF-005",
                            format!("transition {index} has an empty condition"),
                        )
                        .with_context(rule_context.clone()),
                    );
                }
                if transition.target_rule.trim().is_empty() {
                    result.push(
                        ValidationIssue::error(
                            "REF-006",
                            format!("transition {index} has an empty target rule"),
                        )
                        .with_context(rule_context.clone()),
                    );
                } else if !config.has_rule(&transition.target_rule) {
                    result.push(
                        ValidationIssue::error(
                            "REF-007",
                            format!(
                                "transition {index} targets unknown rule '{}'",
                                transition.target_rule
                            ),
                        )
                        .with_context(rule_context.clone()),
                    );
                }
            }

            for action in &rule.actions {
                if let Some(handler) = &action.on_error {
                    if !config.has_rule(&handler.target_rule) {
                        result.push(
                            ValidationIssue::error(
                                "REF-008",
                                format!(
                                    "action '{}' routes errors to unknown rule '{}'",
                                    action.action_id, handler.target_rule
                                ),
                            )
                            .with_context(rule_context.clone()),
                        );
                    }
                }
            }

            if !rule.terminal && rule.transitions.is_empty() {
                result.push(
                    ValidationIssue::warning(
                        "REF-010",
                        format!(
                            "non-terminal rule '{}' has no transitions; execution will halt there",
                            rule.rule_id
                        ),
                    )
                    .with_context(rule_context),
                );
            }
        }

        if let Some(default_error_rule) = &config.global_settings.default_error_rule {
            if !config.has_rule(default_error_rule) {
                result.push(
                    ValidationIssue::error(
                        "REF-009",
                        format!("default error rule '{default_error_rule}' does not exist"),
                    )
                    .with_context(format!("defaultErrorRule '{default_error_rule}'")),
                );
            }
        }

        Ok(result)
    }
}
