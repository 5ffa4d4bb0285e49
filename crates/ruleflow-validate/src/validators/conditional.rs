//! Conditional action validator
//!
//! Static checks over action `condition` strings. These conditions are
//! the one place where an expression failure defaults to "run the
//! action anyway", so the obvious authoring mistakes are surfaced here
//! instead of silently changing behavior at runtime.

use crate::ConfigValidator;
use ruleflow_domain::{Result, RuleEngineConfig, ValidationIssue, ValidationResult};

/// Checks action condition syntax (COND-001..COND-004)
#[derive(Debug, Clone, Copy, Default)]
pub struct ConditionalActionValidator;

impl ConditionalActionValidator {
    /// Create a new conditional-action validator
    pub fn new() -> Self {
        Self
    }

    /// Parenthesis balance, ignoring string literals
    fn parens_balanced(condition: &str) -> bool {
        let mut depth: i32 = 0;
        for c in CodeChars::new(condition) {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth < 0 {
                        return false;
                    }
                }
                _ => {}
            }
        }
        depth == 0
    }

    /// A lone `=` that is not part of `==`, `!=`, `<=`, `>=`
    fn has_single_equals(condition: &str) -> bool {
        let chars: Vec<char> = CodeChars::new(condition).collect();
        let mut i = 0;
        while i < chars.len() {
            if chars[i] == '=' {
                let prev = if i > 0 { Some(chars[i - 1]) } else { None };
                let next = chars.get(i + 1).copied();
                if next == Some('=') {
                    i += 2;
                    continue;
                }
                if matches!(prev, Some('=' | '!' | '<' | '>')) {
                    i += 1;
                    continue;
                }
                return true;
            }
            i += 1;
        }
        false
    }

    fn mixes_logic_without_parens(condition: &str) -> bool {
        let code: String = CodeChars::new(condition).collect();
        code.contains("&&") && code.contains("||") && !code.contains('(')
    }
}

impl ConfigValidator for ConditionalActionValidator {
    fn name(&self) -> &str {
        "conditional-action"
    }

    fn validate(&self, config: &RuleEngineConfig) -> Result<ValidationResult> {
        let mut result = ValidationResult::new();
        for rule in &config.rules {
            for action in &rule.actions {
                let Some(condition) = &action.condition else {
                    continue;
                };
                let context = format!("rule '{}', action '{}'", rule.rule_id, action.action_id);

                if condition.trim().is_empty() {
                    result.push(
                        ValidationIssue::warning("COND-001", "condition is empty")
                            .with_context(context),
                    );
                    continue;
                }
                if !Self::parens_balanced(condition) {
                    result.push(
                        ValidationIssue::error(
                            "COND-002",
                            format!("condition has unbalanced parentheses: '{condition}'"),
                        )
                        .with_context(context.clone()),
                    );
                }
                if Self::has_single_equals(condition) {
                    result.push(
                        ValidationIssue::warning(
                            "COND-003",
                            format!(
                                "condition contains a single '=' (assignment?): '{condition}'"
                            ),
                        )
                        .with_context(context.clone()),
                    );
                }
                if Self::mixes_logic_without_parens(condition) {
                    result.push(
                        ValidationIssue::warning(
                            "COND-004",
                            format!(
                                "condition mixes '&&' and '||' without parentheses: '{condition}'"
                            ),
                        )
                        .with_context(context),
                    );
                }
            }
        }
        Ok(result)
    }
}

/// Iterator over the characters of an expression with string literal
/// contents removed
struct CodeChars<'a> {
    chars: std::str::Chars<'a>,
    in_string: Option<char>,
}

impl<'a> CodeChars<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars(),
            in_string: None,
        }
    }
}

impl Iterator for CodeChars<'_> {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        loop {
            let c = self.chars.next()?;
            match self.in_string {
                Some(quote) => {
                    if c == '\\' {
                        // Skip the escaped character
                        self.chars.next();
                    } else if c == quote {
                        self.in_string = None;
                    }
                }
                None => {
                    if c == '\'' || c == '"' {
                        self.in_string = Some(c);
                    } else {
                        return Some(c);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ruleflow_domain::{ActionDefinition, RuleDefinition};

    fn validate_condition(condition: &str) -> ValidationResult {
        let config = RuleEngineConfig {
            entry_point: "r".into(),
            rules: vec![RuleDefinition {
                rule_id: "r".into(),
                terminal: true,
                actions: vec![ActionDefinition {
                    action_id: "a".into(),
                    action_type: "SCRIPT".into(),
                    condition: Some(condition.into()),
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        };
        ConditionalActionValidator::new()
            .validate(&config)
            .expect("validate")
    }

    #[test]
    fn test_empty_condition_warns() {
        assert!(validate_condition("   ").has_code("COND-001"));
    }

    #[test]
    fn test_unbalanced_parens_is_error() {
        let result = validate_condition("(a > 1 && b < 2");
        assert!(result.has_code("COND-002"));
        assert!(!result.is_valid());
        assert!(validate_condition("a) > 1").has_code("COND-002"));
    }

    #[test]
    fn test_parens_inside_strings_ignored() {
        assert!(validate_condition("name == '(open'").is_empty());
    }

    #[test]
    fn test_single_equals_warns() {
        assert!(validate_condition("status = 'DONE'").has_code("COND-003"));
        assert!(validate_condition("status == 'DONE'").is_empty());
        assert!(validate_condition("a <= 1 && b >= 2 && c != 3").is_empty());
    }

    #[test]
    fn test_mixed_logic_without_parens_warns() {
        assert!(validate_condition("a && b || c").has_code("COND-004"));
        assert!(validate_condition("(a && b) || c").is_empty());
        assert!(validate_condition("a && b && c").is_empty());
    }

    #[test]
    fn test_good_condition_clean() {
        assert!(validate_condition("amount > 100").is_empty());
    }
}
