//! Execution tracing
//!
//! When tracing is enabled on a context, the executor hands the
//! finished step history and variable snapshots to an
//! [`ExecutionTrace`]. Every aggregate is a pure fold over the step
//! vector; nothing here feeds back into execution. The text summary and
//! the Mermaid rendering are purely presentational.

use ruleflow_domain::{ExecutionStep, StepType, Value};
use std::collections::HashMap;
use std::fmt::Write as _;

/// Named snapshot of the context variables at one point in time
#[derive(Debug, Clone)]
pub struct VariableSnapshot {
    /// Snapshot label, e.g. "initial-state"
    pub label: String,
    /// The variables at that point
    pub variables: HashMap<String, Value>,
}

/// Aggregated record of one traced execution
#[derive(Debug, Clone, Default)]
pub struct ExecutionTrace {
    /// Entry-point label of the traced run
    pub label: String,
    /// Every step the engine emitted, in real-time order
    pub steps: Vec<ExecutionStep>,
    /// Variable snapshots taken at "initial-state" and "final-state"
    pub snapshots: Vec<VariableSnapshot>,
    /// Wall-clock duration of the whole run
    pub total_duration_ms: u64,
}

impl ExecutionTrace {
    /// Start a trace for the given entry-point label
    pub fn new<S: Into<String>>(label: S) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    /// Record a named variable snapshot
    pub fn snapshot<S: Into<String>>(&mut self, label: S, variables: &HashMap<String, Value>) {
        self.snapshots.push(VariableSnapshot {
            label: label.into(),
            variables: variables.clone(),
        });
    }

    /// Attach the finished step history and total duration
    pub fn finish(&mut self, steps: Vec<ExecutionStep>, total_duration_ms: u64) {
        self.steps = steps;
        self.total_duration_ms = total_duration_ms;
    }

    /// Rule ids in first-entered order
    pub fn rules_executed(&self) -> Vec<String> {
        let mut rules = Vec::new();
        for step in &self.steps {
            if step.step_type == StepType::RuleEntered {
                if let Some(rule_id) = &step.rule_id {
                    if !rules.contains(rule_id) {
                        rules.push(rule_id.clone());
                    }
                }
            }
        }
        rules
    }

    /// Action ids in first-started order
    pub fn actions_executed(&self) -> Vec<String> {
        let mut actions = Vec::new();
        for step in &self.steps {
            if step.step_type == StepType::ActionStarted {
                if let Some(action_id) = &step.action_id {
                    if !actions.contains(action_id) {
                        actions.push(action_id.clone());
                    }
                }
            }
        }
        actions
    }

    /// Accumulated duration per action id
    pub fn action_durations(&self) -> HashMap<String, u64> {
        let mut durations: HashMap<String, u64> = HashMap::new();
        for step in &self.steps {
            if matches!(
                step.step_type,
                StepType::ActionCompleted | StepType::ActionFailed
            ) {
                if let (Some(action_id), Some(duration)) = (&step.action_id, step.duration_ms) {
                    *durations.entry(action_id.clone()).or_default() += duration;
                }
            }
        }
        durations
    }

    /// Total time spent inside actions
    pub fn total_action_time_ms(&self) -> u64 {
        self.action_durations().values().sum()
    }

    /// Number of ACTION_FAILED steps
    pub fn failed_action_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.step_type == StepType::ActionFailed)
            .count()
    }

    /// Number of steps of the given type
    pub fn count(&self, step_type: StepType) -> usize {
        self.steps
            .iter()
            .filter(|s| s.step_type == step_type)
            .count()
    }

    /// Detailed text summary of the run
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Execution trace: {}", self.label);
        let _ = writeln!(out, "  total duration: {}ms", self.total_duration_ms);
        let _ = writeln!(
            out,
            "  rules executed: {}",
            self.rules_executed().join(" -> ")
        );
        let _ = writeln!(
            out,
            "  actions executed: {} ({} failed), {}ms total",
            self.actions_executed().len(),
            self.failed_action_count(),
            self.total_action_time_ms()
        );
        let durations = self.action_durations();
        let mut actions: Vec<&String> = durations.keys().collect();
        actions.sort();
        for action in actions {
            let _ = writeln!(out, "    {}: {}ms", action, durations[action]);
        }
        let _ = writeln!(out, "  steps ({}):", self.steps.len());
        for step in &self.steps {
            let subject = step
                .action_id
                .as_deref()
                .or(step.rule_id.as_deref())
                .unwrap_or("-");
            match step.duration_ms {
                Some(duration) => {
                    let _ = writeln!(out, "    {} {} ({}ms)", step.step_type, subject, duration);
                }
                None => {
                    let _ = writeln!(out, "    {} {}", step.step_type, subject);
                }
            }
        }
        for snapshot in &self.snapshots {
            let mut keys: Vec<&String> = snapshot.variables.keys().collect();
            keys.sort();
            let _ = writeln!(out, "  {}:", snapshot.label);
            for key in keys {
                let _ = writeln!(out, "    {} = {}", key, snapshot.variables[key]);
            }
        }
        out
    }

    /// Mermaid flowchart of the executed rule path
    pub fn to_mermaid(&self) -> String {
        let mut out = String::from("flowchart TD\n");
        let entered: Vec<&str> = self
            .steps
            .iter()
            .filter(|s| s.step_type == StepType::RuleEntered)
            .filter_map(|s| s.rule_id.as_deref())
            .collect();
        for rule in &self.rules_executed() {
            let _ = writeln!(out, "    {}[\"{}\"]", mermaid_id(rule), rule);
        }
        for pair in entered.windows(2) {
            let _ = writeln!(
                out,
                "    {} --> {}",
                mermaid_id(pair[0]),
                mermaid_id(pair[1])
            );
        }
        out
    }
}

/// A rule id made safe for use as a Mermaid node id
fn mermaid_id(rule_id: &str) -> String {
    rule_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_trace() -> ExecutionTrace {
        let mut trace = ExecutionTrace::new("validate");
        trace.finish(
            vec![
                ExecutionStep::rule_entered("validate"),
                ExecutionStep::action_started("validate", "check"),
                ExecutionStep::action_completed("validate", "check").with_duration(5),
                ExecutionStep::rule_exited("validate"),
                ExecutionStep::rule_entered("approve"),
                ExecutionStep::action_started("approve", "set-status"),
                ExecutionStep::action_failed("approve", "set-status").with_duration(3),
                ExecutionStep::action_started("approve", "set-status"),
                ExecutionStep::action_completed("approve", "set-status").with_duration(2),
                ExecutionStep::rule_exited("approve"),
            ],
            42,
        );
        trace
    }

    #[test]
    fn test_first_occurrence_orders() {
        let trace = sample_trace();
        assert_eq!(trace.rules_executed(), vec!["validate", "approve"]);
        assert_eq!(trace.actions_executed(), vec!["check", "set-status"]);
    }

    #[test]
    fn test_duration_folds() {
        let trace = sample_trace();
        let durations = trace.action_durations();
        assert_eq!(durations.get("check"), Some(&5));
        assert_eq!(durations.get("set-status"), Some(&5));
        assert_eq!(trace.total_action_time_ms(), 10);
        assert_eq!(trace.failed_action_count(), 1);
    }

    #[test]
    fn test_summary_mentions_rules_and_durations() {
        let trace = sample_trace();
        let summary = trace.summary();
        assert!(summary.contains("validate -> approve"));
        assert!(summary.contains("42ms"));
        assert!(summary.contains("RULE_ENTERED"));
    }

    #[test]
    fn test_mermaid_rendering() {
        let trace = sample_trace();
        let mermaid = trace.to_mermaid();
        assert!(mermaid.starts_with("flowchart TD"));
        assert!(mermaid.contains("validate --> approve"));
    }

    #[test]
    fn test_mermaid_id_sanitized() {
        assert_eq!(mermaid_id("check-age"), "check_age");
    }
}
