//! Built-in script action
//!
//! Evaluates a configured expression against the execution context and
//! returns its value as the action payload. The expression is compiled
//! once at creation time, so configuration mistakes surface as
//! action-creation errors during the build/first dispatch rather than
//! mid-traversal.

use async_trait::async_trait;
use ruleflow_domain::{
    Action, ActionDefinition, ActionProvider, ActionResult, Error, ExecutionContext, Result,
    SharedAction,
};
use ruleflow_expr::{CompiledExpression, ExpressionEvaluator};
use std::sync::Arc;

/// Type tag handled by the script provider
pub const SCRIPT_TYPE: &str = "SCRIPT";

/// Provider for the built-in `SCRIPT` action type
pub struct ScriptActionProvider {
    evaluator: Arc<ExpressionEvaluator>,
}

impl ScriptActionProvider {
    /// Create a provider sharing the given evaluator (and its cache)
    pub fn new(evaluator: Arc<ExpressionEvaluator>) -> Self {
        Self { evaluator }
    }
}

impl ActionProvider for ScriptActionProvider {
    fn supports(&self, type_tag: &str) -> bool {
        type_tag.eq_ignore_ascii_case(SCRIPT_TYPE)
    }

    fn create_action(&self, definition: &ActionDefinition) -> Result<SharedAction> {
        let expression = definition
            .config
            .get("expression")
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                Error::action_creation(
                    &definition.action_type,
                    format!(
                        "Script action '{}' requires a non-empty 'expression' config value",
                        definition.action_id
                    ),
                )
            })?;

        let compiled = self.evaluator.compile(expression).map_err(|e| {
            Error::action_creation(
                &definition.action_type,
                format!(
                    "Script action '{}' has an invalid expression: {e}",
                    definition.action_id
                ),
            )
        })?;

        Ok(Arc::new(ScriptAction {
            action_id: definition.action_id.clone(),
            compiled,
        }))
    }

    fn provider_name(&self) -> &str {
        "script"
    }
}

/// An action that evaluates one compiled expression
pub struct ScriptAction {
    action_id: String,
    compiled: CompiledExpression,
}

#[async_trait]
impl Action for ScriptAction {
    async fn execute(&self, ctx: &mut ExecutionContext) -> Result<ActionResult> {
        match self.compiled.evaluate(ctx) {
            Ok(value) => Ok(ActionResult::success(value)),
            // Cooperative timeouts pass through untouched so the engine
            // reports them as timeouts, not action failures
            Err(Error::Timeout { timeout_ms }) => Err(Error::timeout(timeout_ms)),
            Err(e) => Err(Error::action_with_source(
                &self.action_id,
                format!("script evaluation failed: {e}"),
                e,
            )),
        }
    }

    fn action_type(&self) -> &str {
        SCRIPT_TYPE
    }

    fn action_id(&self) -> &str {
        &self.action_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ruleflow_domain::Value;
    use std::collections::HashMap;

    fn provider() -> ScriptActionProvider {
        ScriptActionProvider::new(Arc::new(ExpressionEvaluator::new()))
    }

    fn definition(expression: &str) -> ActionDefinition {
        let mut config = HashMap::new();
        config.insert(
            "expression".to_string(),
            serde_json::Value::String(expression.to_string()),
        );
        ActionDefinition {
            action_id: "calc".into(),
            action_type: "SCRIPT".into(),
            config,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_script_action_evaluates_expression() {
        let action = provider().create_action(&definition("amount * 0.9")).expect("create");
        let mut ctx = ExecutionContext::new().with_variable("amount", 150);
        let result = action.execute(&mut ctx).await.expect("execute");
        assert_eq!(result.payload(), Some(&Value::Float(135.0)));
    }

    #[test]
    fn test_missing_expression_is_creation_error() {
        let definition = ActionDefinition {
            action_id: "calc".into(),
            action_type: "SCRIPT".into(),
            ..Default::default()
        };
        assert!(matches!(
            provider().create_action(&definition),
            Err(Error::ActionCreation { .. })
        ));
    }

    #[test]
    fn test_blank_expression_is_creation_error() {
        assert!(matches!(
            provider().create_action(&definition("   ")),
            Err(Error::ActionCreation { .. })
        ));
    }

    #[test]
    fn test_invalid_expression_fails_at_creation() {
        assert!(matches!(
            provider().create_action(&definition("amount +* 2")),
            Err(Error::ActionCreation { .. })
        ));
    }

    #[tokio::test]
    async fn test_evaluation_failure_becomes_action_error() {
        let action = provider().create_action(&definition("missing + 1")).expect("create");
        let mut ctx = ExecutionContext::new();
        assert!(matches!(
            action.execute(&mut ctx).await,
            Err(Error::Action { .. })
        ));
    }

    #[test]
    fn test_supports_is_case_insensitive() {
        let p = provider();
        assert!(p.supports("SCRIPT"));
        assert!(p.supports("script"));
        assert!(p.supports("Script"));
        assert!(!p.supports("HTTP"));
    }
}
