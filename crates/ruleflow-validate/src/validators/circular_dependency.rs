//! Circular variable dependency validator
//!
//! Within a rule, an action's output depends on the variables its
//! configuration references through `${var}` placeholders (recursively
//! through nested values) and the variables its `outputExpression`
//! reads. If those dependencies form a cycle among variables defined in
//! the same rule, no execution order can satisfy them.

use crate::ConfigValidator;
use once_cell::sync::Lazy;
use regex::Regex;
use ruleflow_domain::{
    ActionDefinition, Result, RuleEngineConfig, ValidationIssue, ValidationResult,
};
use std::collections::{HashMap, HashSet};

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern")
});

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z_][A-Za-z0-9_]*").expect("identifier pattern"));

/// Names that can appear in an output expression without being
/// variable reads
const NON_VARIABLE_NAMES: &[&str] = &["true", "false", "null", "for", "util", "result"];

/// Reports circular variable dependencies within a rule (CIRC-001)
#[derive(Debug, Clone, Copy, Default)]
pub struct CircularDependencyValidator;

impl CircularDependencyValidator {
    /// Create a new circular-dependency validator
    pub fn new() -> Self {
        Self
    }

    /// Variables an action's output depends on
    fn dependencies(action: &ActionDefinition) -> HashSet<String> {
        let mut deps = HashSet::new();
        for value in action.config.values() {
            Self::scan_config_value(value, &mut deps);
        }
        if let Some(expression) = &action.output_expression {
            Self::scan_expression(expression, &mut deps);
        }
        deps
    }

    /// Collect `${var}` placeholders recursively through nested values
    fn scan_config_value(value: &serde_json::Value, deps: &mut HashSet<String>) {
        match value {
            serde_json::Value::String(s) => {
                for capture in PLACEHOLDER.captures_iter(s) {
                    deps.insert(capture[1].to_string());
                }
            }
            serde_json::Value::Array(items) => {
                for item in items {
                    Self::scan_config_value(item, deps);
                }
            }
            serde_json::Value::Object(map) => {
                for item in map.values() {
                    Self::scan_config_value(item, deps);
                }
            }
            _ => {}
        }
    }

    /// Collect root identifiers read by an expression
    ///
    /// Identifiers preceded by `.` are member or method names, not
    /// variable reads.
    fn scan_expression(expression: &str, deps: &mut HashSet<String>) {
        for m in IDENTIFIER.find_iter(expression) {
            if m.start() > 0 && expression[..m.start()].ends_with('.') {
                continue;
            }
            let name = m.as_str();
            if NON_VARIABLE_NAMES.contains(&name) {
                continue;
            }
            deps.insert(name.to_string());
        }
    }

    /// DFS cycle search over the per-rule variable graph
    fn find_cycle(graph: &HashMap<&str, HashSet<&str>>) -> Option<Vec<String>> {
        #[derive(Clone, Copy, PartialEq)]
        enum Color {
            White,
            Gray,
            Black,
        }

        let mut color: HashMap<&str, Color> =
            graph.keys().map(|&k| (k, Color::White)).collect();

        let mut roots: Vec<&str> = graph.keys().copied().collect();
        roots.sort_unstable();
        for root in roots {
            if color.get(root) != Some(&Color::White) {
                continue;
            }
            // Explicit work list: (node, next successor index)
            let mut stack: Vec<(&str, usize)> = vec![(root, 0)];
            let mut path: Vec<&str> = vec![root];
            color.insert(root, Color::Gray);

            while let Some((node, index)) = stack.last().copied() {
                let successors = Self::sorted_successors(graph, node);
                if index < successors.len() {
                    if let Some(entry) = stack.last_mut() {
                        entry.1 += 1;
                    }
                    let next = successors[index];
                    match color.get(next).copied().unwrap_or(Color::Black) {
                        Color::White => {
                            color.insert(next, Color::Gray);
                            stack.push((next, 0));
                            path.push(next);
                        }
                        Color::Gray => {
                            let start = path.iter().position(|&n| n == next).unwrap_or(0);
                            let mut cycle: Vec<String> =
                                path[start..].iter().map(|&n| n.to_string()).collect();
                            cycle.push(next.to_string());
                            return Some(cycle);
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
        None
    }

    fn sorted_successors<'a>(
        graph: &HashMap<&'a str, HashSet<&'a str>>,
        node: &str,
    ) -> Vec<&'a str> {
        let mut successors: Vec<&str> = graph
            .get(node)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default();
        successors.sort_unstable();
        successors
    }
}

impl ConfigValidator for CircularDependencyValidator {
    fn name(&self) -> &str {
        "circular-dependency"
    }

    fn validate(&self, config: &RuleEngineConfig) -> Result<ValidationResult> {
        let mut result = ValidationResult::new();

        for rule in &config.rules {
            // Variables defined by this rule's actions
            let outputs: HashSet<&str> = rule
                .actions
                .iter()
                .filter_map(|a| a.output_variable.as_deref())
                .collect();
            if outputs.is_empty() {
                continue;
            }

            let mut graph: HashMap<&str, HashSet<&str>> = HashMap::new();
            let dependencies: Vec<HashSet<String>> =
                rule.actions.iter().map(Self::dependencies).collect();
            for (action, deps) in rule.actions.iter().zip(&dependencies) {
                let Some(output) = action.output_variable.as_deref() else {
                    continue;
                };
                let entry = graph.entry(output).or_default();
                for dep in deps {
                    // Only edges among this rule's own outputs matter
                    if let Some(&known) = outputs.get(dep.as_str()) {
                        entry.insert(known);
                    }
                }
            }

            if let Some(cycle) = Self::find_cycle(&graph) {
                result.push(
                    ValidationIssue::error(
                        "CIRC-001",
                        format!(
                            "circular variable dependency in rule '{}': {}",
                            rule.rule_id,
                            cycle.join(" -> ")
                        ),
                    )
                    .with_context(format!("rule '{}'", rule.rule_id)),
                );
            }
        }

        Ok(result)
    }
}
