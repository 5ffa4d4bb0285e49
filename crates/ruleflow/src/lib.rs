//! ruleflow - a declarative, JSON-configured rule workflow engine
//!
//! A workflow is a set of named rules, each bundling a sequence of
//! parameterized actions and guarded transitions to other rules. Given
//! a mutable key/value execution context, the engine traverses the rule
//! graph from an entry point, runs actions (primarily expression
//! scripts), stores their outputs back into the context, picks a
//! successor by the first truthy transition guard, and terminates on a
//! terminal rule, a rule with no matching transition, or a failure.
//!
//! This facade crate re-exports the public API of the workspace layers:
//!
//! - [`ruleflow_domain`]: configuration model, [`Value`],
//!   [`ExecutionContext`], validation issue types, action ports.
//! - [`ruleflow_expr`]: the embedded expression language and its
//!   evaluator.
//! - [`ruleflow_providers`]: the action provider registry and built-in
//!   providers.
//! - [`ruleflow_validate`]: composable configuration validators.
//! - [`ruleflow_engine`]: the executor, builder, loader, and tracing.
//!
//! # Example
//!
//! ```ignore
//! use ruleflow::{ConfigLoader, ExecutionContext, ExecutorBuilder};
//!
//! let config = ConfigLoader::from_str(r#"{
//!     "entryPoint": "validate",
//!     "rules": [
//!         {
//!             "ruleId": "validate",
//!             "transitions": [
//!                 {"condition": "age >= 18", "targetRule": "approve", "priority": 1},
//!                 {"condition": "!(age >= 18)", "targetRule": "reject", "priority": 2}
//!             ]
//!         },
//!         {
//!             "ruleId": "approve",
//!             "actions": [{"actionId": "set-status", "type": "SCRIPT",
//!                          "config": {"expression": "'APPROVED'"},
//!                          "outputVariable": "status"}],
//!             "terminal": true
//!         },
//!         {
//!             "ruleId": "reject",
//!             "actions": [{"actionId": "set-status", "type": "SCRIPT",
//!                          "config": {"expression": "'REJECTED'"},
//!                          "outputVariable": "status"}],
//!             "terminal": true
//!         }
//!     ]
//! }"#)?;
//!
//! let executor = ExecutorBuilder::new(config).build()?;
//! let mut ctx = ExecutionContext::new().with_variable("age", 25);
//! let result = executor.execute(&mut ctx).await;
//! assert!(result.success);
//! assert_eq!(result.final_rule_id.as_deref(), Some("approve"));
//! ```

pub use ruleflow_domain::{
    Action, ActionDefinition, ActionProvider, ActionResult, Deadline, Error, ErrorHandlerDefinition,
    ErrorInfo, ExecutionContext, ExecutionStep, FromValue, GlobalSettings, Result, RuleDefinition,
    RuleEngineConfig, Severity, SharedAction, SharedActionProvider, StepType, TransitionDefinition,
    ValidationIssue, ValidationResult, Value,
};
pub use ruleflow_engine::{
    ConfigLoader, ExecutionResult, ExecutionTrace, ExecutorBuilder, RuleExecutor,
    VariableSnapshot,
};
pub use ruleflow_expr::{CompiledExpression, ExpressionEvaluator};
pub use ruleflow_providers::{ActionRegistry, NoopActionProvider, ScriptActionProvider};
pub use ruleflow_validate::{
    CircularDependencyValidator, CompositeValidator, ConditionalActionValidator, ConfigValidator,
    CycleDetector, DuplicateActionValidator, ReachabilityValidator, ReferenceValidator,
};
