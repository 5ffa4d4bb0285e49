//! Static configuration model
//!
//! Typed representation of the JSON workflow document: a set of named
//! rules, each bundling parameterized actions and guarded transitions,
//! plus global limits. Deserialization is forward-compatible: unknown
//! keys are ignored, and anywhere an array is expected a single scalar
//! is accepted as a one-element array.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default maximum number of rule entries per execution
pub const DEFAULT_MAX_EXECUTION_DEPTH: u32 = 50;

/// Default wall-clock timeout per execution, in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

fn default_version() -> String {
    "1.0".to_string()
}

fn default_max_execution_depth() -> u32 {
    DEFAULT_MAX_EXECUTION_DEPTH
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

/// Accept either `x` or `[x, ...]` where a list is expected
fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany<T> {
        Many(Vec<T>),
        One(T),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::Many(items) => items,
        OneOrMany::One(item) => vec![item],
    })
}

/// Root configuration for one rule workflow
///
/// Invariant: rule ids are unique within a configuration. The
/// `ReferenceValidator` reports violations; the model itself does not
/// reject them so that validation can describe every problem at once.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RuleEngineConfig {
    /// Informational schema version
    #[serde(default = "default_version")]
    pub version: String,
    /// Rule id at which every execution begins
    #[serde(default)]
    pub entry_point: String,
    /// Global limits and defaults
    #[serde(default)]
    pub global_settings: GlobalSettings,
    /// Ordered rule definitions
    #[serde(default, deserialize_with = "one_or_many")]
    pub rules: Vec<RuleDefinition>,
}

impl RuleEngineConfig {
    /// Look up a rule by id
    pub fn rule(&self, rule_id: &str) -> Option<&RuleDefinition> {
        self.rules.iter().find(|r| r.rule_id == rule_id)
    }

    /// Whether a rule with the given id exists
    pub fn has_rule(&self, rule_id: &str) -> bool {
        self.rule(rule_id).is_some()
    }

    /// All rule ids in definition order
    pub fn rule_ids(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.rule_id.as_str()).collect()
    }
}

/// Global limits applied to every execution
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSettings {
    /// Maximum number of rule entries before the run fails
    #[serde(default = "default_max_execution_depth")]
    pub max_execution_depth: u32,
    /// Wall-clock bound for one `execute` call, in milliseconds
    #[serde(rename = "timeout", alias = "timeoutMs", default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Rule to route unhandled action failures to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_error_rule: Option<String>,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            max_execution_depth: DEFAULT_MAX_EXECUTION_DEPTH,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            default_error_rule: None,
        }
    }
}

/// A named node of the workflow graph
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RuleDefinition {
    /// Unique rule identifier
    #[serde(default)]
    pub rule_id: String,
    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Actions executed in definition order when the rule is entered
    #[serde(default, deserialize_with = "one_or_many")]
    pub actions: Vec<ActionDefinition>,
    /// Guarded out-edges to other rules
    #[serde(default, deserialize_with = "one_or_many")]
    pub transitions: Vec<TransitionDefinition>,
    /// Terminal rules end execution; their transitions are ignored
    #[serde(default)]
    pub terminal: bool,
}

impl RuleDefinition {
    /// Look up an action by id within this rule
    pub fn action(&self, action_id: &str) -> Option<&ActionDefinition> {
        self.actions.iter().find(|a| a.action_id == action_id)
    }

    /// Transitions in evaluation order: descending priority, ties broken
    /// by order of appearance
    pub fn sorted_transitions(&self) -> Vec<&TransitionDefinition> {
        let mut sorted: Vec<&TransitionDefinition> = self.transitions.iter().collect();
        sorted.sort_by(|a, b| b.priority.cmp(&a.priority));
        sorted
    }
}

/// One unit of work inside a rule
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ActionDefinition {
    /// Identifier, unique within the enclosing rule
    #[serde(default)]
    pub action_id: String,
    /// Action type tag, matched case-insensitively against providers
    #[serde(rename = "type", default)]
    pub action_type: String,
    /// Opaque provider-specific configuration
    #[serde(default)]
    pub config: HashMap<String, serde_json::Value>,
    /// Pre-evaluation guard; the action is skipped when it is falsy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    /// Context key to store the action result under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_variable: Option<String>,
    /// Extraction expression over the raw result, bound as `result`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_expression: Option<String>,
    /// Log and proceed on failure instead of surfacing it
    #[serde(default)]
    pub continue_on_error: bool,
    /// Action-level error routing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_error: Option<ErrorHandlerDefinition>,
}

/// Action-level error handler
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ErrorHandlerDefinition {
    /// Rule to route to when the action fails
    #[serde(default)]
    pub target_rule: String,
}

/// A guarded directed edge between rules
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TransitionDefinition {
    /// Boolean guard expression; the first truthy guard wins
    #[serde(default)]
    pub condition: String,
    /// Rule this transition leads to
    #[serde(default)]
    pub target_rule: String,
    /// Higher priorities are evaluated first
    #[serde(default)]
    pub priority: i32,
    /// Variable renaming applied on traversal: target-name -> source-name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_transform: Option<HashMap<String, String>>,
    /// Informational only; terminality is a property of the target rule
    #[serde(default)]
    pub terminal: bool,
}
