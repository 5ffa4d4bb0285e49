//! End-to-end workflow scenarios
//!
//! Each test builds an executor from a literal JSON document, runs it
//! against a seeded context, and asserts on the result and the mutated
//! context.

use ruleflow_domain::{ExecutionContext, StepType, Value};
use ruleflow_engine::{ConfigLoader, ExecutorBuilder, RuleExecutor};

fn executor(json: &str) -> RuleExecutor {
    let config = ConfigLoader::from_str(json).expect("config must parse");
    ExecutorBuilder::new(config).build().expect("build must succeed")
}

const VALIDATE_APPROVE_REJECT: &str = r#"{
    "version": "1.0",
    "entryPoint": "validate",
    "rules": [
        {
            "ruleId": "validate",
            "transitions": [
                {"condition": "age >= 18", "targetRule": "approve", "priority": 1},
                {"condition": "!(age >= 18)", "targetRule": "reject", "priority": 2}
            ]
        },
        {
            "ruleId": "approve",
            "actions": [{
                "actionId": "set-status",
                "type": "SCRIPT",
                "config": {"expression": "'APPROVED'"},
                "outputVariable": "status"
            }],
            "terminal": true
        },
        {
            "ruleId": "reject",
            "actions": [{
                "actionId": "set-status",
                "type": "SCRIPT",
                "config": {"expression": "'REJECTED'"},
                "outputVariable": "status"
            }],
            "terminal": true
        }
    ]
}"#;

#[tokio::test]
async fn adult_is_approved() {
    let executor = executor(VALIDATE_APPROVE_REJECT);
    let mut ctx = ExecutionContext::new().with_variable("age", 25);
    let result = executor.execute(&mut ctx).await;

    assert!(result.success, "unexpected failure: {:?}", result.error);
    assert_eq!(result.final_rule_id.as_deref(), Some("approve"));
    assert_eq!(ctx.get_variable("status"), Some(&Value::String("APPROVED".into())));
}

#[tokio::test]
async fn minor_is_rejected() {
    let executor = executor(VALIDATE_APPROVE_REJECT);
    let mut ctx = ExecutionContext::new().with_variable("age", 15);
    let result = executor.execute(&mut ctx).await;

    assert!(result.success, "unexpected failure: {:?}", result.error);
    assert_eq!(result.final_rule_id.as_deref(), Some("reject"));
    assert_eq!(ctx.get_variable("status"), Some(&Value::String("REJECTED".into())));
}

const CONDITIONAL_DISCOUNT: &str = r#"{
    "entryPoint": "price",
    "rules": [{
        "ruleId": "price",
        "actions": [
            {
                "actionId": "discount",
                "type": "SCRIPT",
                "condition": "amount > 100",
                "config": {"expression": "amount * 0.9"},
                "outputVariable": "discountedAmount"
            },
            {
                "actionId": "total",
                "type": "SCRIPT",
                "config": {"expression": "util.roundTo((discountedAmount != null ? discountedAmount : amount) * 1.1, 2)"},
                "outputVariable": "total"
            }
        ],
        "terminal": true
    }]
}"#;

#[tokio::test]
async fn small_amount_skips_discount() {
    let executor = executor(CONDITIONAL_DISCOUNT);
    let mut ctx = ExecutionContext::new().with_variable("amount", 50);
    let result = executor.execute(&mut ctx).await;

    assert!(result.success, "unexpected failure: {:?}", result.error);
    assert!(!ctx.has_variable("discountedAmount"));
    assert_eq!(ctx.get_variable("total"), Some(&Value::Float(55.0)));
}

#[tokio::test]
async fn large_amount_is_discounted() {
    let executor = executor(CONDITIONAL_DISCOUNT);
    let mut ctx = ExecutionContext::new().with_variable("amount", 150);
    let result = executor.execute(&mut ctx).await;

    assert!(result.success, "unexpected failure: {:?}", result.error);
    assert_eq!(ctx.get_variable("discountedAmount"), Some(&Value::Float(135.0)));
    assert_eq!(ctx.get_variable("total"), Some(&Value::Float(148.5)));
}

#[tokio::test]
async fn depth_limit_stops_self_loop() {
    let executor = executor(
        r#"{
            "entryPoint": "A",
            "globalSettings": {"maxExecutionDepth": 5},
            "rules": [{
                "ruleId": "A",
                "transitions": [{"condition": "true", "targetRule": "A"}]
            }]
        }"#,
    );
    let mut ctx = ExecutionContext::new();
    let result = executor.execute(&mut ctx).await;

    assert!(!result.success);
    let message = result.error.expect("error message");
    assert!(message.contains("depth"), "unexpected message: {message}");
    assert_eq!(result.final_rule_id.as_deref(), Some("A"));

    let entries = ctx
        .history
        .iter()
        .filter(|s| s.step_type == StepType::RuleEntered)
        .count();
    assert_eq!(entries, 5, "no rule entry beyond the depth limit");
}

#[tokio::test]
async fn output_expression_extracts_nested_value() {
    let executor = executor(
        r#"{
            "entryPoint": "fetch",
            "rules": [{
                "ruleId": "fetch",
                "actions": [{
                    "actionId": "load-user",
                    "type": "SCRIPT",
                    "config": {"expression": "util.fromJson('{\"data\": {\"user\": {\"id\": \"U1\"}}}')"},
                    "outputVariable": "userId",
                    "outputExpression": "result.data.user.id"
                }],
                "terminal": true
            }]
        }"#,
    );
    let mut ctx = ExecutionContext::new();
    let result = executor.execute(&mut ctx).await;

    assert!(result.success, "unexpected failure: {:?}", result.error);
    assert_eq!(ctx.get_variable("userId"), Some(&Value::String("U1".into())));
    assert!(!ctx.has_variable("result"));
    assert!(
        ctx.variables.keys().all(|k| !k.starts_with("__ruleflow_result")),
        "temporary binding leaked: {:?}",
        ctx.variables.keys().collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn cpu_bound_script_times_out() {
    let executor = executor(
        r#"{
            "entryPoint": "burn",
            "globalSettings": {"timeout": 50},
            "rules": [{
                "ruleId": "burn",
                "actions": [{
                    "actionId": "spin",
                    "type": "SCRIPT",
                    "config": {"expression": "t = 0; for (i : items) { for (j : items) { t = t + 1 } }; t"}
                }],
                "terminal": true
            }]
        }"#,
    );
    let items: Vec<Value> = (0..10_000).map(Value::Int).collect();
    let mut ctx = ExecutionContext::new().with_variable("items", Value::List(items));
    let result = executor.execute(&mut ctx).await;

    assert!(!result.success);
    let message = result.error.expect("error message");
    assert!(
        message.contains("Execution timed out after 50ms"),
        "unexpected message: {message}"
    );
}

const ERROR_ROUTING_ACTION_LEVEL: &str = r#"{
    "entryPoint": "X",
    "rules": [
        {
            "ruleId": "X",
            "actions": [{
                "actionId": "fail",
                "type": "SCRIPT",
                "config": {"expression": "missing + 1"},
                "onError": {"targetRule": "recover"}
            }],
            "terminal": true
        },
        {
            "ruleId": "recover",
            "actions": [{
                "actionId": "set-status",
                "type": "SCRIPT",
                "config": {"expression": "'RECOVERED'"},
                "outputVariable": "status"
            }],
            "terminal": true
        }
    ]
}"#;

#[tokio::test]
async fn action_level_error_handler_recovers() {
    let executor = executor(ERROR_ROUTING_ACTION_LEVEL);
    let mut ctx = ExecutionContext::new();
    let result = executor.execute(&mut ctx).await;

    assert!(result.success, "unexpected failure: {:?}", result.error);
    assert_eq!(result.final_rule_id.as_deref(), Some("recover"));
    assert_eq!(ctx.get_variable("status"), Some(&Value::String("RECOVERED".into())));
    // The failure is still recorded on the context
    let error = ctx.error.as_ref().expect("error info recorded");
    assert_eq!(error.rule_id, "X");
    assert_eq!(error.action_id.as_deref(), Some("fail"));
}

#[tokio::test]
async fn default_error_rule_recovers() {
    let executor = executor(
        r#"{
            "entryPoint": "X",
            "globalSettings": {"defaultErrorRule": "recover"},
            "rules": [
                {
                    "ruleId": "X",
                    "actions": [{
                        "actionId": "fail",
                        "type": "SCRIPT",
                        "config": {"expression": "missing + 1"}
                    }],
                    "terminal": true
                },
                {
                    "ruleId": "recover",
                    "actions": [{
                        "actionId": "set-status",
                        "type": "SCRIPT",
                        "config": {"expression": "'RECOVERED'"},
                        "outputVariable": "status"
                    }],
                    "terminal": true
                }
            ]
        }"#,
    );
    let mut ctx = ExecutionContext::new();
    let result = executor.execute(&mut ctx).await;

    assert!(result.success, "unexpected failure: {:?}", result.error);
    assert_eq!(result.final_rule_id.as_deref(), Some("recover"));
    assert_eq!(ctx.get_variable("status"), Some(&Value::String("RECOVERED".into())));
}

#[tokio::test]
async fn unhandled_action_failure_surfaces() {
    let executor = executor(
        r#"{
            "entryPoint": "X",
            "rules": [{
                "ruleId": "X",
                "actions": [{
                    "actionId": "fail",
                    "type": "SCRIPT",
                    "config": {"expression": "missing + 1"}
                }],
                "terminal": true
            }]
        }"#,
    );
    let mut ctx = ExecutionContext::new();
    let result = executor.execute(&mut ctx).await;

    assert!(!result.success);
    assert_eq!(result.final_rule_id.as_deref(), Some("X"));
    assert!(result.error.expect("error").contains("fail"));
}
