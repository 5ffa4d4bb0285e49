//! Cycle detector
//!
//! Three-color depth-first search over the rule graph with an explicit
//! work list, so deeply nested configurations cannot exhaust the call
//! stack. Every gray-to-gray back edge records the cycle slice from the
//! ancestor back to itself. Cycles are warnings, not errors: looping
//! workflows are sometimes intentional and rely on their guards (and
//! the depth limit) to terminate.

use crate::ConfigValidator;
use ruleflow_domain::{Result, RuleEngineConfig, ValidationIssue, ValidationResult};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Reports directed cycles in the rule graph (CYCLE-001)
#[derive(Debug, Clone, Copy, Default)]
pub struct CycleDetector;

impl CycleDetector {
    /// Create a new cycle detector
    pub fn new() -> Self {
        Self
    }

    fn successors<'a>(config: &'a RuleEngineConfig, rule_id: &str) -> Vec<&'a str> {
        let Some(rule) = config.rule(rule_id) else {
            return Vec::new();
        };
        let mut successors: Vec<&str> = Vec::new();
        let targets = rule
            .transitions
            .iter()
            .map(|t| t.target_rule.as_str())
            .chain(
                rule.actions
                    .iter()
                    .filter_map(|a| a.on_error.as_ref())
                    .map(|h| h.target_rule.as_str()),
            );
        for target in targets {
            // Dangling targets belong to the reference validator
            if config.has_rule(target) && !successors.contains(&target) {
                successors.push(target);
            }
        }
        successors
    }
}

impl ConfigValidator for CycleDetector {
    fn name(&self) -> &str {
        "cycle"
    }

    fn validate(&self, config: &RuleEngineConfig) -> Result<ValidationResult> {
        let mut result = ValidationResult::new();

        let mut color: HashMap<&str, Color> = config
            .rules
            .iter()
            .map(|r| (r.rule_id.as_str(), Color::White))
            .collect();

        for rule in &config.rules {
            let root = rule.rule_id.as_str();
            if color.get(root) != Some(&Color::White) {
                continue;
            }

            // Explicit DFS work list: (node, next successor index)
            let mut stack: Vec<(&str, usize)> = vec![(root, 0)];
            let mut path: Vec<&str> = vec![root];
            color.insert(root, Color::Gray);

            while let Some((node, index)) = stack.last().copied() {
                let successors = Self::successors(config, node);
                if index < successors.len() {
                    if let Some(entry) = stack.last_mut() {
                        entry.1 += 1;
                    }
                    let next = successors[index];
                    match color.get(next).copied().unwrap_or(Color::White) {
                        Color::White => {
                            color.insert(next, Color::Gray);
                            stack.push((next, 0));
                            path.push(next);
                        }
                        Color::Gray => {
                            // Back edge: slice the gray path from the
                            // ancestor back to itself
                            let start = path.iter().position(|&n| n == next).unwrap_or(0);
                            let mut cycle: Vec<&str> = path[start..].to_vec();
                            cycle.push(next);
                            result.push(
                                ValidationIssue::warning(
                                    "CYCLE-001",
                                    format!("cycle detected: {}", cycle.join(" -> ")),
                                )
                                .with_context(format!("rule '{next}'")),
                            );
                        }
                        Color::Black => {}
                    }
                } else {
                    color.insert(node, Color::Black);
                    stack.pop();
                    path.pop();
                }
            }
        }

        Ok(result)
    }
}
