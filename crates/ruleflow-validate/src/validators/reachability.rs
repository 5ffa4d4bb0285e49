//! Reachability validator
//!
//! Breadth-first search over the rule graph from the entry point. Edges
//! are transition targets and action-level error-handler targets; when
//! a default error rule is configured a virtual edge from the entry
//! point covers it. Unreachable rules are reported as warnings: they
//! are dead configuration, not a broken one.

use crate::ConfigValidator;
use ruleflow_domain::{Result, RuleEngineConfig, ValidationIssue, ValidationResult};
use std::collections::{HashSet, VecDeque};

/// Reports rules no path from the entry point reaches (REACH-001)
#[derive(Debug, Clone, Copy, Default)]
pub struct ReachabilityValidator;

impl ReachabilityValidator {
    /// Create a new reachability validator
    pub fn new() -> Self {
        Self
    }
}

impl ConfigValidator for ReachabilityValidator {
    fn name(&self) -> &str {
        "reachability"
    }

    fn validate(&self, config: &RuleEngineConfig) -> Result<ValidationResult> {
        let mut result = ValidationResult::new();

        let mut visited: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::new();

        visited.insert(config.entry_point.as_str());
        queue.push_back(config.entry_point.as_str());
        if let Some(default_error_rule) = &config.global_settings.default_error_rule {
            // Virtual edge: error routing can reach this rule from
            // anywhere, so treat it as reachable from the entry point
            if visited.insert(default_error_rule.as_str()) {
                queue.push_back(default_error_rule.as_str());
            }
        }

        while let Some(current) = queue.pop_front() {
            let Some(rule) = config.rule(current) else {
                continue;
            };
            let successors = rule
                .transitions
                .iter()
                .map(|t| t.target_rule.as_str())
                .chain(
                    rule.actions
                        .iter()
                        .filter_map(|a| a.on_error.as_ref())
                        .map(|h| h.target_rule.as_str()),
                );
            for successor in successors {
                if visited.insert(successor) {
                    queue.push_back(successor);
                }
            }
        }

        for rule in &config.rules {
            if !visited.contains(rule.rule_id.as_str()) {
                result.push(
                    ValidationIssue::warning(
                        "REACH-001",
                        format!(
                            "rule '{}' is unreachable from entry point '{}'",
                            rule.rule_id, config.entry_point
                        ),
                    )
                    .with_context(format!("rule '{}'", rule.rule_id)),
                );
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ruleflow_domain::{
        ActionDefinition, ErrorHandlerDefinition, GlobalSettings, RuleDefinition,
        TransitionDefinition,
    };

    fn rule_to(id: &str, target: Option<&str>) -> RuleDefinition {
        RuleDefinition {
            rule_id: id.into(),
            terminal: target.is_none(),
            transitions: target
                .map(|t| {
                    vec![TransitionDefinition {
                        condition: "true".into(),
                        target_rule: t.into(),
                        ..Default::default()
                    }]
                })
                .unwrap_or_default(),
            ..Default::default()
        }
    }

    fn validate(config: &RuleEngineConfig) -> ValidationResult {
        ReachabilityValidator::new()
            .validate(config)
            .expect("validate")
    }

    #[test]
    fn test_linear_chain_fully_reachable() {
        let config = RuleEngineConfig {
            entry_point: "a".into(),
            rules: vec![rule_to("a", Some("b")), rule_to("b", Some("c")), rule_to("c", None)],
            ..Default::default()
        };
        assert!(validate(&config).is_empty());
    }

    #[test]
    fn test_orphan_rule_warned() {
        let config = RuleEngineConfig {
            entry_point: "a".into(),
            rules: vec![rule_to("a", None), rule_to("island", None)],
            ..Default::default()
        };
        let result = validate(&config);
        assert!(result.has_code("REACH-001"));
        assert!(result.is_valid());
    }

    #[test]
    fn test_on_error_target_is_reachable() {
        let mut a = rule_to("a", None);
        a.actions = vec![ActionDefinition {
            action_id: "act".into(),
            action_type: "SCRIPT".into(),
            on_error: Some(ErrorHandlerDefinition {
                target_rule: "recover".into(),
            }),
            ..Default::default()
        }];
        let config = RuleEngineConfig {
            entry_point: "a".into(),
            rules: vec![a, rule_to("recover", None)],
            ..Default::default()
        };
        assert!(validate(&config).is_empty());
    }

    #[test]
    fn test_default_error_rule_virtual_edge() {
        let config = RuleEngineConfig {
            entry_point: "a".into(),
            global_settings: GlobalSettings {
                default_error_rule: Some("recover".into()),
                ..Default::default()
            },
            rules: vec![rule_to("a", None), rule_to("recover", None)],
            ..Default::default()
        };
        assert!(validate(&config).is_empty());
    }

    #[test]
    fn test_unknown_entry_point_marks_everything_unreachable() {
        let config = RuleEngineConfig {
            entry_point: "ghost".into(),
            rules: vec![rule_to("a", None), rule_to("b", None)],
            ..Default::default()
        };
        let result = validate(&config);
        assert_eq!(result.issues.len(), 2);
    }
}
