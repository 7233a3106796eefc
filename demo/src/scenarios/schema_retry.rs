//! Scenario 1: Schema Retry
//!
//! A specialist returns a triage result with no affordances. The schema and
//! smoke verifiers both reject it, the failure is categorized as a schema
//! violation, and the policy retries the same specialist with the schema
//! attached.
//!
//!   Task A: the specialist complies on the retry → accepted on attempt 2
//!   Task B: the specialist never complies → escalated at the ceiling

use std::sync::Arc;

use verdict_contracts::{
    error::VerdictResult,
    input::ContextResult,
    retry::{ContextDelta, ErrorCategory, RetryAction},
    verify::VerificationSuiteResult,
};
use verdict_core::{SuiteConfig, VerificationSuite};
use verdict_verify::{ReplayVerifier, SchemaVerifier, SmokeVerifier};

use super::{print_outcome, Harness, TaskRun};
use crate::mock_specialists::{result, triage_task, SpecialistPool};

// ── Specialists ───────────────────────────────────────────────────────────────

/// `specialist-primary` fixes its output once the schema is attached;
/// `specialist-stubborn` ignores it.
struct SchemaPool;

impl SpecialistPool for SchemaPool {
    fn respond(&self, specialist_id: &str, delta: Option<&ContextDelta>) -> ContextResult {
        let schema_attached = delta.is_some_and(|d| d.include_schema);
        if specialist_id == "specialist-primary" && schema_attached {
            return result(
                &["Checkout test times out waiting for the 3-D Secure iframe to load"],
                &[("stub the 3-D Secure provider", "the sandbox provider is slow in CI")],
            );
        }
        result(&["Checkout test times out waiting for the 3-D Secure iframe to load"], &[])
    }
}

// ── Categorizer ───────────────────────────────────────────────────────────────

fn categorize(verdict: &VerificationSuiteResult, _result: &ContextResult) -> (ErrorCategory, f64) {
    let failed = verdict.failed_verifiers();
    if failed.contains(&SchemaVerifier::NAME) {
        (ErrorCategory::SchemaViolation, 0.95)
    } else if failed.contains(&SmokeVerifier::NAME) {
        (ErrorCategory::LowConfidence, 0.6)
    } else {
        (ErrorCategory::Unknown, 0.5)
    }
}

// ── Run ───────────────────────────────────────────────────────────────────────

pub async fn run_scenario() -> VerdictResult<()> {
    println!("=== Scenario 1: Schema Retry ===");
    println!();

    let suite = VerificationSuite::new(SuiteConfig::default())
        .with_verifier(Arc::new(SchemaVerifier::new()))
        .with_verifier(Arc::new(SmokeVerifier::default()))
        .with_verifier(Arc::new(ReplayVerifier::default()));
    let harness = Harness::new(suite)?;

    println!("  Task A: specialist-primary, complies once the schema is attached");
    println!();
    let outcome = harness
        .run(
            TaskRun {
                trace_id: "trace-schema-a",
                task: triage_task("checkout", "pays_with_3ds_card"),
                first_specialist: "specialist-primary",
                baseline: None,
                categorize,
            },
            &SchemaPool,
        )
        .await?;
    print_outcome(&outcome);
    if outcome.action != RetryAction::Accept || outcome.attempts != 2 {
        println!("  UNEXPECTED: {:?}", outcome);
    }

    println!("  Task B: specialist-stubborn, never attaches affordances");
    println!();
    let outcome = harness
        .run(
            TaskRun {
                trace_id: "trace-schema-b",
                task: triage_task("checkout", "pays_with_saved_card"),
                first_specialist: "specialist-stubborn",
                baseline: None,
                categorize,
            },
            &SchemaPool,
        )
        .await?;
    print_outcome(&outcome);
    if outcome.action != RetryAction::Escalate {
        println!("  UNEXPECTED: {:?}", outcome);
    }

    Ok(())
}
