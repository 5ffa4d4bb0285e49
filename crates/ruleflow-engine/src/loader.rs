//! Configuration loading
//!
//! Parses the JSON workflow document into a [`RuleEngineConfig`]. The
//! loader is forward-compatible and forgiving where the document format
//! allows it: unknown keys are ignored, a single object is accepted
//! where an array is expected, and a top-level
//! `{"ruleEngineConfig": ...}` wrapper is unwrapped. Failures carry the
//! origin (string or file path) and the underlying parse message.

use ruleflow_domain::{Error, Result, RuleEngineConfig};
use std::path::Path;

/// Loads workflow configurations from JSON
pub struct ConfigLoader;

impl ConfigLoader {
    /// Parse a configuration from a JSON string
    pub fn from_str(content: &str) -> Result<RuleEngineConfig> {
        let json: serde_json::Value = serde_json::from_str(content).map_err(|e| {
            Error::configuration_with_source(
                format!("failed to parse configuration string: {e}"),
                e,
            )
        })?;
        Self::from_value(json)
    }

    /// Read and parse a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<RuleEngineConfig> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration_with_source(
                format!("failed to read configuration file '{}': {e}", path.display()),
                e,
            )
        })?;
        let json: serde_json::Value = serde_json::from_str(&content).map_err(|e| {
            Error::configuration_with_source(
                format!(
                    "failed to parse configuration file '{}': {e}",
                    path.display()
                ),
                e,
            )
        })?;
        Self::from_value(json)
    }

    /// Convert an already-parsed JSON value
    pub fn from_value(mut json: serde_json::Value) -> Result<RuleEngineConfig> {
        // Some producers wrap the document in a named root object
        if let serde_json::Value::Object(map) = &mut json {
            if let Some(inner) = map.remove("ruleEngineConfig") {
                json = inner;
            }
        }
        serde_json::from_value(json).map_err(|e| {
            Error::configuration_with_source(format!("invalid configuration document: {e}"), e)
        })
    }
}
