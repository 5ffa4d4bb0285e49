//! Expression evaluator
//!
//! The public surface of the expression subsystem: compile (with
//! caching), evaluate, boolean and typed evaluation, and a parse-only
//! validity check.

use crate::ast::Program;
use crate::cache::{DEFAULT_CACHE_SIZE, ExpressionCache};
use crate::interp;
use crate::parser;
use ruleflow_domain::{Error, ExecutionContext, FromValue, Result, Value};
use std::sync::Arc;

/// A reusable compiled expression
#[derive(Debug, Clone)]
pub struct CompiledExpression {
    source: String,
    program: Arc<Program>,
}

impl CompiledExpression {
    /// The original source text
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Run the compiled form against a context
    pub fn evaluate(&self, ctx: &ExecutionContext) -> Result<Value> {
        interp::evaluate(&self.program, &self.source, ctx)
    }

    /// Run and coerce the result to a boolean
    pub fn evaluate_boolean(&self, ctx: &ExecutionContext) -> Result<bool> {
        Ok(self.evaluate(ctx)?.is_truthy())
    }
}

/// Compiles and evaluates expressions against execution contexts
///
/// Shared read-mostly: one evaluator (and its cache) serves every
/// execution of an executor concurrently.
#[derive(Debug, Default)]
pub struct ExpressionEvaluator {
    cache: ExpressionCache,
}

impl ExpressionEvaluator {
    /// Create an evaluator with the default cache size
    pub fn new() -> Self {
        Self::with_cache_size(DEFAULT_CACHE_SIZE)
    }

    /// Create an evaluator with a custom cache size
    pub fn with_cache_size(max_size: usize) -> Self {
        Self {
            cache: ExpressionCache::new(max_size),
        }
    }

    /// Whether a source is a multi-statement script
    ///
    /// Scripts are detected by the presence of a statement separator or
    /// a `for (` loop header.
    pub fn is_script(source: &str) -> bool {
        source.contains(';') || source.contains("for (") || source.contains("for(")
    }

    /// Compile a source, consulting the cache for single expressions
    pub fn compile(&self, source: &str) -> Result<CompiledExpression> {
        if Self::is_script(source) {
            let stmts = parser::parse_script(source)?;
            return Ok(CompiledExpression {
                source: source.to_string(),
                program: Arc::new(Program::Script(stmts)),
            });
        }
        if let Some(program) = self.cache.get(source) {
            return Ok(CompiledExpression {
                source: source.to_string(),
                program,
            });
        }
        let program = Arc::new(Program::Expression(parser::parse_expression(source)?));
        self.cache.insert(source, Arc::clone(&program));
        Ok(CompiledExpression {
            source: source.to_string(),
            program,
        })
    }

    /// Compile (or fetch cached) and evaluate
    pub fn evaluate(&self, source: &str, ctx: &ExecutionContext) -> Result<Value> {
        self.compile(source)?.evaluate(ctx)
    }

    /// Evaluate and coerce to a boolean
    pub fn evaluate_boolean(&self, source: &str, ctx: &ExecutionContext) -> Result<bool> {
        Ok(self.evaluate(source, ctx)?.is_truthy())
    }

    /// Evaluate and convert to a concrete type
    ///
    /// Null evaluates to `None`; any other value of the wrong runtime
    /// type is a type-mismatch expression error.
    pub fn evaluate_as<T: FromValue>(
        &self,
        source: &str,
        ctx: &ExecutionContext,
    ) -> Result<Option<T>> {
        match self.evaluate(source, ctx)? {
            Value::Null => Ok(None),
            value => T::from_value(&value).map(Some).ok_or_else(|| {
                Error::expression(
                    source,
                    format!(
                        "expected {}, found {}",
                        T::TYPE_NAME,
                        value.type_name()
                    ),
                )
            }),
        }
    }

    /// Parse-only validity check; never fails
    pub fn is_valid(&self, source: &str) -> bool {
        if Self::is_script(source) {
            parser::parse_script(source).is_ok()
        } else {
            parser::parse_expression(source).is_ok()
        }
    }

    /// Number of cached single expressions
    pub fn cached_expressions(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ExecutionContext {
        ExecutionContext::new()
            .with_variable("age", 25)
            .with_variable("amount", 150)
            .with_variable("name", "alice")
    }

    #[test]
    fn test_single_expression_arithmetic() {
        let evaluator = ExpressionEvaluator::new();
        let ctx = ctx();
        assert_eq!(
            evaluator.evaluate("amount * 0.9", &ctx).unwrap(),
            Value::Float(135.0)
        );
        assert_eq!(
            evaluator.evaluate("1 + 2 * 3", &ctx).unwrap(),
            Value::Int(7)
        );
        assert_eq!(
            evaluator.evaluate("10 / 4", &ctx).unwrap(),
            Value::Float(2.5)
        );
        assert_eq!(evaluator.evaluate("10 / 5", &ctx).unwrap(), Value::Int(2));
    }

    #[test]
    fn test_string_concatenation() {
        let evaluator = ExpressionEvaluator::new();
        assert_eq!(
            evaluator
                .evaluate("'hello ' + name + '!'", &ctx())
                .unwrap(),
            Value::String("hello alice!".into())
        );
        assert_eq!(
            evaluator.evaluate("'total: ' + 55.0", &ctx()).unwrap(),
            Value::String("total: 55.0".into())
        );
    }

    #[test]
    fn test_null_arithmetic_fails() {
        let evaluator = ExpressionEvaluator::new();
        assert!(matches!(
            evaluator.evaluate("missing + 1", &ctx()),
            Err(Error::Expression { .. })
        ));
    }

    #[test]
    fn test_boolean_coercion() {
        let evaluator = ExpressionEvaluator::new();
        let ctx = ctx();
        assert!(evaluator.evaluate_boolean("age >= 18", &ctx).unwrap());
        assert!(!evaluator.evaluate_boolean("age >= 18 && amount < 100", &ctx).unwrap());
        assert!(evaluator.evaluate_boolean("name", &ctx).unwrap());
        assert!(!evaluator.evaluate_boolean("'false'", &ctx).unwrap());
        assert!(!evaluator.evaluate_boolean("0", &ctx).unwrap());
        assert!(!evaluator.evaluate_boolean("missing", &ctx).unwrap());
    }

    #[test]
    fn test_ternary_with_null_guard() {
        let evaluator = ExpressionEvaluator::new();
        let ctx = ctx();
        assert_eq!(
            evaluator
                .evaluate("discounted != null ? discounted : amount", &ctx)
                .unwrap(),
            Value::Int(150)
        );
    }

    #[test]
    fn test_member_and_index_access() {
        let evaluator = ExpressionEvaluator::new();
        let json: serde_json::Value = serde_json::from_str(
            r#"{"data": {"user": {"id": "U1", "roles": ["admin", "dev"]}}}"#,
        )
        .expect("json");
        let ctx = ExecutionContext::new().with_variable("payload", Value::from_json(&json));
        assert_eq!(
            evaluator.evaluate("payload.data.user.id", &ctx).unwrap(),
            Value::String("U1".into())
        );
        assert_eq!(
            evaluator
                .evaluate("payload.data.user.roles[1]", &ctx)
                .unwrap(),
            Value::String("dev".into())
        );
        assert_eq!(
            evaluator.evaluate("payload.data.missing.id", &ctx).unwrap(),
            Value::Null
        );
        assert_eq!(
            evaluator
                .evaluate("payload.data.user.roles[9]", &ctx)
                .unwrap(),
            Value::Null
        );
    }

    #[test]
    fn test_methods_and_util() {
        let evaluator = ExpressionEvaluator::new();
        let ctx = ctx();
        assert_eq!(
            evaluator.evaluate("name.toUpperCase()", &ctx).unwrap(),
            Value::String("ALICE".into())
        );
        assert_eq!(
            evaluator
                .evaluate("util.roundTo(amount * 1.1, 2)", &ctx)
                .unwrap(),
            Value::Float(165.0)
        );
        // Method dispatch is allowlisted
        assert!(evaluator.evaluate("name.getClass()", &ctx).is_err());
    }

    #[test]
    fn test_script_with_loop() {
        let evaluator = ExpressionEvaluator::new();
        let ctx = ExecutionContext::new().with_variable(
            "items",
            Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)]),
        );
        let script = "total = 0; for (i : items) { total = total + i }; total * 10";
        assert_eq!(evaluator.evaluate(script, &ctx).unwrap(), Value::Int(60));
    }

    #[test]
    fn test_script_locals_do_not_touch_context() {
        let evaluator = ExpressionEvaluator::new();
        let ctx = ExecutionContext::new().with_variable("x", 1);
        assert_eq!(
            evaluator.evaluate("y = x + 1; y", &ctx).unwrap(),
            Value::Int(2)
        );
        assert!(!ctx.has_variable("y"));
        assert_eq!(ctx.get_variable("x"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_cache_only_for_single_expressions() {
        let evaluator = ExpressionEvaluator::new();
        let ctx = ctx();
        evaluator.evaluate("age + 1", &ctx).unwrap();
        evaluator.evaluate("age + 1", &ctx).unwrap();
        assert_eq!(evaluator.cached_expressions(), 1);
        evaluator.evaluate("a = 1; a", &ctx).unwrap();
        assert_eq!(evaluator.cached_expressions(), 1);
    }

    #[test]
    fn test_evaluate_as() {
        let evaluator = ExpressionEvaluator::new();
        let ctx = ctx();
        assert_eq!(
            evaluator.evaluate_as::<i64>("age + 1", &ctx).unwrap(),
            Some(26)
        );
        assert_eq!(
            evaluator.evaluate_as::<String>("missing", &ctx).unwrap(),
            None
        );
        assert!(matches!(
            evaluator.evaluate_as::<String>("age", &ctx),
            Err(Error::Expression { .. })
        ));
    }

    #[test]
    fn test_is_valid_never_fails() {
        let evaluator = ExpressionEvaluator::new();
        assert!(evaluator.is_valid("a + b * 2"));
        assert!(evaluator.is_valid("t = 1; t"));
        assert!(!evaluator.is_valid("a +* b"));
        assert!(!evaluator.is_valid("(a"));
        assert!(!evaluator.is_valid(""));
    }

    #[test]
    fn test_deadline_aborts_loops() {
        use ruleflow_domain::Deadline;
        use std::time::Instant;

        let evaluator = ExpressionEvaluator::new();
        let big: Vec<Value> = (0..1_000_000).map(Value::Int).collect();
        let mut ctx = ExecutionContext::new().with_variable("items", Value::List(big));
        ctx.deadline = Some(Deadline {
            at: Instant::now(),
            timeout_ms: 50,
        });
        let script = "t = 0; for (i : items) { t = t + i }; t";
        assert!(matches!(
            evaluator.evaluate(script, &ctx),
            Err(Error::Timeout { timeout_ms: 50 })
        ));
    }
}
