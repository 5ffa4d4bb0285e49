//! Rule traversal state machine
//!
//! One `execute` call runs a single logical traversal cooperating with
//! one timeout watcher. The traversal future is dropped when the
//! wall-clock deadline elapses (every action await is a cancellation
//! point), and CPU-bound expression loops additionally poll the
//! cooperative deadline carried in the context. Variable mutations
//! already performed stay in the context; there is no rollback.
//!
//! `execute` never surfaces an error to the caller: every outcome is
//! encoded in the returned [`ExecutionResult`].

use crate::trace::ExecutionTrace;
use once_cell::sync::Lazy;
use regex::Regex;
use ruleflow_domain::{
    ActionDefinition, ActionResult, Deadline, Error, ErrorInfo, ExecutionContext, ExecutionStep,
    Result, RuleDefinition, RuleEngineConfig, Value,
};
use ruleflow_expr::ExpressionEvaluator;
use ruleflow_providers::ActionRegistry;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use uuid::Uuid;

/// Matches the `result` identifier inside an output expression
static RESULT_IDENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bresult\b").expect("result identifier pattern"));

/// Outcome of one `execute` call
#[derive(Debug)]
pub struct ExecutionResult {
    /// Whether the traversal completed without a surfaced failure
    pub success: bool,
    /// The rule the traversal ended in, when known
    pub final_rule_id: Option<String>,
    /// Failure message, when `success` is false
    pub error: Option<String>,
    /// Wall-clock time of the whole call
    pub duration_ms: u64,
    /// Aggregated trace, when tracing was enabled on the context
    pub trace: Option<ExecutionTrace>,
}

impl ExecutionResult {
    fn success(final_rule_id: String, duration_ms: u64) -> Self {
        Self {
            success: true,
            final_rule_id: Some(final_rule_id),
            error: None,
            duration_ms,
            trace: None,
        }
    }

    fn failure(error: String, final_rule_id: Option<String>, duration_ms: u64) -> Self {
        Self {
            success: false,
            final_rule_id,
            error: Some(error),
            duration_ms,
            trace: None,
        }
    }
}

/// An action failure paired with the action it came from, for routing
struct ActionFailure {
    action_id: String,
    error: Error,
}

/// Executes one workflow configuration
///
/// Shared and immutable after construction: distinct contexts can be
/// executed concurrently against the same executor.
#[derive(Debug)]
pub struct RuleExecutor {
    rules: HashMap<String, RuleDefinition>,
    entry_point: String,
    max_depth: u32,
    timeout_ms: u64,
    default_error_rule: Option<String>,
    registry: Arc<ActionRegistry>,
    evaluator: Arc<ExpressionEvaluator>,
}

impl RuleExecutor {
    /// Assemble an executor from its parts
    ///
    /// Prefer [`crate::ExecutorBuilder`], which also validates the
    /// configuration and registers the built-in providers.
    pub fn new(
        config: RuleEngineConfig,
        registry: Arc<ActionRegistry>,
        evaluator: Arc<ExpressionEvaluator>,
    ) -> Self {
        let mut rules = HashMap::new();
        for rule in config.rules {
            // First definition wins on duplicate ids; the reference
            // validator reports the duplication
            rules.entry(rule.rule_id.clone()).or_insert(rule);
        }
        Self {
            rules,
            entry_point: config.entry_point,
            max_depth: config.global_settings.max_execution_depth,
            timeout_ms: config.global_settings.timeout_ms,
            default_error_rule: config.global_settings.default_error_rule,
            registry,
            evaluator,
        }
    }

    /// The configured entry point rule id
    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    /// The provider registry backing this executor
    pub fn registry(&self) -> &Arc<ActionRegistry> {
        &self.registry
    }

    /// The expression evaluator backing this executor
    pub fn evaluator(&self) -> &Arc<ExpressionEvaluator> {
        &self.evaluator
    }

    /// Run the workflow against a context
    ///
    /// The context is exclusively borrowed for the duration of the
    /// call; it must not be reused by a concurrent execution.
    pub async fn execute(&self, ctx: &mut ExecutionContext) -> ExecutionResult {
        let started = Instant::now();

        if self.entry_point.trim().is_empty() {
            return ExecutionResult::failure("No entry point configured".to_string(), None, 0);
        }

        let mut trace = ctx.trace_enabled.then(|| {
            let mut trace = ExecutionTrace::new(&self.entry_point);
            trace.snapshot("initial-state", &ctx.variables);
            trace
        });

        ctx.deadline = Some(Deadline::from_timeout_ms(self.timeout_ms));
        let timeout = Duration::from_millis(self.timeout_ms);
        let outcome = match tokio::time::timeout(timeout, self.traverse(ctx)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(Error::timeout(self.timeout_ms)),
        };
        ctx.deadline = None;

        let duration_ms = started.elapsed().as_millis() as u64;
        let mut result = match outcome {
            Ok(final_rule_id) => ExecutionResult::success(final_rule_id, duration_ms),
            Err(e) => {
                warn!(error = %e, "execution failed");
                ExecutionResult::failure(e.to_string(), ctx.current_rule_id.clone(), duration_ms)
            }
        };

        if let Some(trace) = trace.as_mut() {
            trace.snapshot("final-state", &ctx.variables);
            trace.finish(ctx.history.clone(), duration_ms);
        }
        result.trace = trace;
        result
    }

    // ---- traversal -------------------------------------------------

    async fn traverse(&self, ctx: &mut ExecutionContext) -> Result<String> {
        let mut current = self.entry_point.clone();
        loop {
            if ctx.deadline_exceeded() {
                return Err(Error::timeout(self.timeout_ms));
            }
            if ctx.depth >= self.max_depth {
                return Err(Error::rule_execution(
                    &current,
                    format!("Maximum execution depth exceeded: {}", self.max_depth),
                ));
            }
            let rule = self.rules.get(&current).ok_or_else(|| {
                Error::rule_execution(&current, format!("Rule '{current}' not found"))
            })?;

            ctx.current_rule_id = Some(current.clone());
            ctx.depth += 1;
            ctx.record_step(ExecutionStep::rule_entered(&current));
            debug!(rule = %current, depth = ctx.depth, "entering rule");

            if let Err(failure) = self.run_actions(rule, ctx).await {
                if matches!(failure.error, Error::Timeout { .. }) {
                    return Err(failure.error);
                }
                ctx.record_step(
                    ExecutionStep::error_occurred(&current)
                        .with_action(&failure.action_id)
                        .with_metadata("error", failure.error.to_string()),
                );
                ctx.set_error(
                    ErrorInfo::new(
                        &current,
                        failure.error.error_type(),
                        failure.error.to_string(),
                    )
                    .with_action(&failure.action_id),
                );
                match self.route_error(rule, &failure.action_id) {
                    Some(next) => {
                        warn!(
                            rule = %current,
                            action = %failure.action_id,
                            target = %next,
                            "action failed, routing to error rule"
                        );
                        current = next;
                        continue;
                    }
                    None => return Err(failure.error),
                }
            }

            ctx.record_step(ExecutionStep::rule_exited(&current));

            if rule.terminal {
                return Ok(current);
            }
            match self.select_transition(rule, ctx)? {
                Some(next) => current = next,
                // No matching transition halts the run successfully
                None => return Ok(current),
            }
        }
    }

    // ---- action execution ------------------------------------------

    async fn run_actions(
        &self,
        rule: &RuleDefinition,
        ctx: &mut ExecutionContext,
    ) -> std::result::Result<(), ActionFailure> {
        for definition in &rule.actions {
            if let Some(condition) = &definition.condition {
                let should_run = match self.evaluator.evaluate_boolean(condition, ctx) {
                    Ok(matched) => matched,
                    Err(Error::Timeout { timeout_ms }) => {
                        return Err(ActionFailure {
                            action_id: definition.action_id.clone(),
                            error: Error::timeout(timeout_ms),
                        });
                    }
                    Err(e) => {
                        // A malformed condition must not silently drop
                        // the action; validators flag these statically
                        warn!(
                            action = %definition.action_id,
                            condition = %condition,
                            error = %e,
                            "condition evaluation failed, defaulting to true"
                        );
                        true
                    }
                };
                if !should_run {
                    debug!(action = %definition.action_id, "condition falsy, skipping action");
                    continue;
                }
            }

            ctx.record_step(ExecutionStep::action_started(
                &rule.rule_id,
                &definition.action_id,
            ));
            let started = Instant::now();
            let executed = match self.registry.create_action(definition) {
                Ok(action) => action.execute(ctx).await,
                // Instantiation failures route like action errors
                Err(e) => Err(e),
            };
            let elapsed = started.elapsed().as_millis() as u64;

            let outcome = match executed {
                Ok(ActionResult::Success { payload }) => self.bind_output(definition, payload, ctx),
                Ok(ActionResult::Failure { message, cause }) => Err(match cause {
                    Some(cause) => Error::action(
                        &definition.action_id,
                        format!("{message} (cause: {cause})"),
                    ),
                    None => Error::action(&definition.action_id, message),
                }),
                Err(e) => Err(e),
            };

            match outcome {
                Ok(()) => {
                    ctx.record_step(
                        ExecutionStep::action_completed(&rule.rule_id, &definition.action_id)
                            .with_duration(elapsed),
                    );
                }
                Err(error) => {
                    if matches!(error, Error::Timeout { .. }) {
                        return Err(ActionFailure {
                            action_id: definition.action_id.clone(),
                            error,
                        });
                    }
                    ctx.record_step(
                        ExecutionStep::action_failed(&rule.rule_id, &definition.action_id)
                            .with_duration(elapsed)
                            .with_metadata("error", error.to_string()),
                    );
                    if definition.continue_on_error {
                        warn!(
                            action = %definition.action_id,
                            error = %error,
                            "action failed, continuing on error"
                        );
                    } else {
                        return Err(ActionFailure {
                            action_id: definition.action_id.clone(),
                            error,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Bind a successful action payload into the context
    ///
    /// With an `outputExpression`, the raw payload is bound to a
    /// uniquely named temporary, references to `result` are rewritten
    /// to that name, and the temporary is removed again even when the
    /// extractor fails. The rewrite keeps `result` out of user space: a
    /// plain binding would clash with a user variable of that name.
    fn bind_output(
        &self,
        definition: &ActionDefinition,
        payload: Option<Value>,
        ctx: &mut ExecutionContext,
    ) -> Result<()> {
        let Some(output_variable) = &definition.output_variable else {
            return Ok(());
        };
        let raw = payload.unwrap_or(Value::Null);

        let Some(extractor) = &definition.output_expression else {
            ctx.set_variable(output_variable.clone(), raw);
            return Ok(());
        };

        let temp = format!("__ruleflow_result_{}", Uuid::new_v4().simple());
        ctx.set_variable(temp.clone(), raw);
        let rewritten = RESULT_IDENT.replace_all(extractor, temp.as_str());
        let extracted = self.evaluator.evaluate(&rewritten, ctx);
        ctx.remove_variable(&temp);

        match extracted {
            Ok(value) => {
                ctx.set_variable(output_variable.clone(), value);
                Ok(())
            }
            Err(Error::Timeout { timeout_ms }) => Err(Error::timeout(timeout_ms)),
            Err(e) => Err(Error::action(
                &definition.action_id,
                format!("output expression '{extractor}' failed: {e}"),
            )),
        }
    }

    // ---- transitions and error routing -----------------------------

    fn select_transition(
        &self,
        rule: &RuleDefinition,
        ctx: &mut ExecutionContext,
    ) -> Result<Option<String>> {
        for transition in rule.sorted_transitions() {
            let matched = self
                .evaluator
                .evaluate_boolean(&transition.condition, ctx)
                .map_err(|e| match e {
                    Error::Timeout { .. } => e,
                    e => Error::rule_execution(
                        &rule.rule_id,
                        format!(
                            "Failed to evaluate transition condition '{}': {e}",
                            transition.condition
                        ),
                    ),
                })?;
            ctx.record_step(
                ExecutionStep::transition_evaluated(&rule.rule_id)
                    .with_metadata("condition", &transition.condition)
                    .with_metadata("result", matched.to_string())
                    .with_metadata("targetRule", &transition.target_rule),
            );
            if matched {
                if let Some(transform) = &transition.context_transform {
                    for (target, source) in transform {
                        let value = ctx.variable_or_null(source);
                        ctx.set_variable(target.clone(), value);
                    }
                }
                return Ok(Some(transition.target_rule.clone()));
            }
        }
        Ok(None)
    }

    /// Pick the rule to route a failed action to, if any
    fn route_error(&self, rule: &RuleDefinition, action_id: &str) -> Option<String> {
        rule.action(action_id)
            .and_then(|a| a.on_error.as_ref())
            .map(|handler| handler.target_rule.clone())
            .or_else(|| self.default_error_rule.clone())
    }
}
