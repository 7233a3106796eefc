//! Simulated specialists for the demo scenarios.
//!
//! Everything here is hardcoded. No model or external system is contacted;
//! each pool answers deterministically by specialist id and by whatever the
//! retry policy put in the context delta.

use serde_json::{json, Map, Value};

use verdict_contracts::{
    input::{Affordance, ContextResult, TaskSpec},
    retry::ContextDelta,
};

/// A set of specialists addressable by id.
pub trait SpecialistPool: Send + Sync {
    /// Produce a candidate result from `specialist_id`, honoring `delta` if
    /// the previous attempt's decision attached one.
    fn respond(&self, specialist_id: &str, delta: Option<&ContextDelta>) -> ContextResult;
}

// ── Builders ──────────────────────────────────────────────────────────────────

pub fn result(summary: &[&str], affordances: &[(&str, &str)]) -> ContextResult {
    ContextResult {
        summary: summary.iter().map(|s| s.to_string()).collect(),
        affordances: affordances
            .iter()
            .map(|(action, why)| Affordance::new(*action, *why))
            .collect(),
        explain: None,
    }
}

pub fn with_explain(mut result: ContextResult, explain: Value) -> ContextResult {
    if let Value::Object(map) = explain {
        result.explain = Some(map);
    }
    result
}

/// A `triage_failure` task for one failing end-to-end test.
pub fn triage_task(suite: &str, failing_test: &str) -> TaskSpec {
    let mut inputs = Map::new();
    inputs.insert("suite".to_string(), json!(suite));
    inputs.insert("failing_test".to_string(), json!(failing_test));
    inputs.insert("browser".to_string(), json!("firefox"));
    TaskSpec::new("triage_failure", inputs)
}
