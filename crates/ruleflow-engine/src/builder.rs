//! Executor assembly
//!
//! Builds a [`RuleExecutor`] from a parsed configuration: validates it
//! (on by default), creates the shared expression evaluator, registers
//! the built-in action providers plus any host-supplied ones, and hands
//! everything to the executor. Build fails iff validation produced an
//! ERROR issue; warnings are logged and kept in the result.

use crate::executor::RuleExecutor;
use ruleflow_domain::{Error, Result, RuleEngineConfig, SharedActionProvider};
use ruleflow_expr::ExpressionEvaluator;
use ruleflow_providers::{ActionRegistry, NoopActionProvider, ScriptActionProvider};
use ruleflow_validate::CompositeValidator;
use std::sync::Arc;
use tracing::warn;

/// Assembles a [`RuleExecutor`] from configuration and providers
pub struct ExecutorBuilder {
    config: RuleEngineConfig,
    providers: Vec<SharedActionProvider>,
    validate_on_startup: bool,
    include_built_in_actions: bool,
    evaluator: Option<Arc<ExpressionEvaluator>>,
    validator: Option<CompositeValidator>,
}

impl ExecutorBuilder {
    /// Start building an executor for the given configuration
    pub fn new(config: RuleEngineConfig) -> Self {
        Self {
            config,
            providers: Vec::new(),
            validate_on_startup: true,
            include_built_in_actions: true,
            evaluator: None,
            validator: None,
        }
    }

    /// Register one host-supplied action provider
    pub fn with_provider(mut self, provider: SharedActionProvider) -> Self {
        self.providers.push(provider);
        self
    }

    /// Register several host-supplied action providers
    pub fn with_providers<I>(mut self, providers: I) -> Self
    where
        I: IntoIterator<Item = SharedActionProvider>,
    {
        self.providers.extend(providers);
        self
    }

    /// Whether to validate the configuration before building
    /// (default: true)
    pub fn validate_on_startup(mut self, validate: bool) -> Self {
        self.validate_on_startup = validate;
        self
    }

    /// Whether to register the built-in `SCRIPT` and `NOOP` providers
    /// (default: true)
    pub fn include_built_in_actions(mut self, include: bool) -> Self {
        self.include_built_in_actions = include;
        self
    }

    /// Use a shared evaluator instead of creating a fresh one
    pub fn with_evaluator(mut self, evaluator: Arc<ExpressionEvaluator>) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    /// Use a custom validator chain instead of the standard one
    pub fn with_validator(mut self, validator: CompositeValidator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Validate, wire the registry, and build the executor
    pub fn build(self) -> Result<RuleExecutor> {
        if self.validate_on_startup {
            let validator = self.validator.unwrap_or_else(CompositeValidator::standard);
            let result = validator.validate(&self.config);
            for warning in result.warnings() {
                warn!(code = %warning.code, "configuration warning: {}", warning.message);
            }
            if !result.is_valid() {
                return Err(Error::validation(result));
            }
        }

        let evaluator = self
            .evaluator
            .unwrap_or_else(|| Arc::new(ExpressionEvaluator::new()));

        let registry = Arc::new(ActionRegistry::new());
        if self.include_built_in_actions {
            registry.register(Arc::new(ScriptActionProvider::new(Arc::clone(&evaluator))));
            registry.register(Arc::new(NoopActionProvider::new()));
        }
        for provider in self.providers {
            registry.register(provider);
        }

        Ok(RuleExecutor::new(self.config, registry, evaluator))
    }
}
