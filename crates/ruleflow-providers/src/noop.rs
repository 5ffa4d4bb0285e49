//! Noop action provider for testing
//!
//! An action that does nothing and succeeds with no payload. Useful for
//! wiring tests, placeholder rules, and as the minimal example of a
//! custom provider.

use async_trait::async_trait;
use ruleflow_domain::{
    Action, ActionDefinition, ActionProvider, ActionResult, ExecutionContext, Result,
    SharedAction,
};
use std::sync::Arc;

/// Provider for the `NOOP` action type
#[derive(Debug, Clone, Default)]
pub struct NoopActionProvider;

impl NoopActionProvider {
    /// Create a new noop provider
    pub fn new() -> Self {
        Self
    }
}

impl ActionProvider for NoopActionProvider {
    fn supports(&self, type_tag: &str) -> bool {
        type_tag.eq_ignore_ascii_case("NOOP")
    }

    fn create_action(&self, definition: &ActionDefinition) -> Result<SharedAction> {
        Ok(Arc::new(NoopAction {
            action_id: definition.action_id.clone(),
        }))
    }

    fn provider_name(&self) -> &str {
        "noop"
    }
}

/// An action that succeeds without touching the context
pub struct NoopAction {
    action_id: String,
}

#[async_trait]
impl Action for NoopAction {
    async fn execute(&self, _ctx: &mut ExecutionContext) -> Result<ActionResult> {
        Ok(ActionResult::success_empty())
    }

    fn action_type(&self) -> &str {
        "NOOP"
    }

    fn action_id(&self) -> &str {
        &self.action_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_succeeds_with_no_payload() {
        let provider = NoopActionProvider::new();
        let definition = ActionDefinition {
            action_id: "skip".into(),
            action_type: "noop".into(),
            ..Default::default()
        };
        let action = provider.create_action(&definition).expect("create");
        let mut ctx = ExecutionContext::new();
        let result = action.execute(&mut ctx).await.expect("execute");
        assert!(result.is_success());
        assert!(result.payload().is_none());
    }
}
