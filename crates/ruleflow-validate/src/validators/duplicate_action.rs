//! Duplicate action validator
//!
//! Action ids must be unique within their rule: error routing looks the
//! failed action up by id, and a duplicate would make that lookup
//! ambiguous.

use crate::ConfigValidator;
use ruleflow_domain::{Result, RuleEngineConfig, ValidationIssue, ValidationResult};
use std::collections::HashSet;

/// Reports duplicate action ids within a rule (DUP-001)
#[derive(Debug, Clone, Copy, Default)]
pub struct DuplicateActionValidator;

impl DuplicateActionValidator {
    /// Create a new duplicate-action validator
    pub fn new() -> Self {
        Self
    }
}

impl ConfigValidator for DuplicateActionValidator {
    fn name(&self) -> &str {
        "duplicate-action"
    }

    fn validate(&self, config: &RuleEngineConfig) -> Result<ValidationResult> {
        let mut result = ValidationResult::new();
        for rule in &config.rules {
            let mut seen: HashSet<&str> = HashSet::new();
            for action in &rule.actions {
                if !seen.insert(action.action_id.as_str()) {
                    result.push(
                        ValidationIssue::error(
                            "DUP-001",
                            format!(
                                "duplicate action id '{}' in rule '{}'",
                                action.action_id, rule.rule_id
                            ),
                        )
                        .with_context(format!("rule '{}'", rule.rule_id)),
                    );
                }
            }
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ruleflow_domain::{ActionDefinition, RuleDefinition};

    fn action(id: &str) -> ActionDefinition {
        ActionDefinition {
            action_id: id.into(),
            action_type: "SCRIPT".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_duplicate_within_rule_is_error() {
        let config = RuleEngineConfig {
            entry_point: "r".into(),
            rules: vec![RuleDefinition {
                rule_id: "r".into(),
                terminal: true,
                actions: vec![action("a"), action("b"), action("a")],
                ..Default::default()
            }],
            ..Default::default()
        };
        let result = DuplicateActionValidator::new()
            .validate(&config)
            .expect("validate");
        assert!(result.has_code("DUP-001"));
        assert!(!result.is_valid());
    }

    #[test]
    fn test_same_id_across_rules_is_fine() {
        let rule = |id: &str| RuleDefinition {
            rule_id: id.into(),
            terminal: true,
            actions: vec![action("shared")],
            ..Default::default()
        };
        let config = RuleEngineConfig {
            entry_point: "r1".into(),
            rules: vec![rule("r1"), rule("r2")],
            ..Default::default()
        };
        let result = DuplicateActionValidator::new()
            .validate(&config)
            .expect("validate");
        assert!(result.is_empty());
    }
}
