//! Scenario 3: Slow Verifier
//!
//! An artifact-fetch verifier downloads the evidence bundle a specialist
//! references before passing judgement. The primary specialist attaches a
//! huge trace bundle, so the fetch overruns the suite deadline and the suite
//! substitutes a timed-out failure. The failure is categorized as a timeout
//! and routed to the performance specialist, whose compact bundle fetches in
//! time.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use serde_json::{json, Map};
use tracing::debug;

use verdict_contracts::{
    error::VerdictResult,
    input::{ContextResult, VerificationInput},
    retry::{ContextDelta, ErrorCategory, RetryAction},
    verify::{VerificationResult, VerificationSuiteResult},
};
use verdict_core::{SuiteConfig, VerificationSuite, Verifier};
use verdict_verify::{SchemaVerifier, SmokeVerifier};

use super::{print_outcome, Harness, TaskRun};
use crate::mock_specialists::{result, triage_task, with_explain, SpecialistPool};

/// Suite deadline for this scenario.
const SUITE_TIMEOUT_MS: u64 = 200;

/// Simulated fetch throughput.
const BYTES_PER_MS: u64 = 100_000;

// ── Verifier ──────────────────────────────────────────────────────────────────

/// Fetches `explain.artifact_bytes` worth of evidence before passing.
struct ArtifactFetchVerifier;

#[async_trait]
impl Verifier for ArtifactFetchVerifier {
    fn name(&self) -> &str {
        "artifact-fetch"
    }

    async fn verify(&self, input: &VerificationInput, _timeout_ms: u64) -> VerificationResult {
        let start = Instant::now();
        let bytes = input
            .context_result
            .explain
            .as_ref()
            .and_then(|e| e.get("artifact_bytes"))
            .and_then(|v| v.as_u64())
            .unwrap_or(0);

        let fetch_ms = bytes / BYTES_PER_MS;
        debug!(bytes, fetch_ms, "fetching evidence bundle");
        tokio::time::sleep(Duration::from_millis(fetch_ms)).await;

        let mut evidence = Map::new();
        evidence.insert("artifact_bytes".to_string(), json!(bytes));
        VerificationResult::new(
            self.name(),
            true,
            1.0,
            "evidence bundle fetched",
            evidence,
            start.elapsed().as_secs_f64() * 1000.0,
        )
    }
}

// ── Specialists ───────────────────────────────────────────────────────────────

struct BundlePool;

impl SpecialistPool for BundlePool {
    fn respond(&self, specialist_id: &str, _delta: Option<&ContextDelta>) -> ContextResult {
        let base = result(
            &["Search results render after the suggestions request resolves late"],
            &[("await the suggestions response", "assertions run before the list renders")],
        );
        let artifact_bytes: u64 = if specialist_id == "specialist-performance" {
            2_000_000
        } else {
            60_000_000
        };
        with_explain(base, json!({ "artifact_bytes": artifact_bytes }))
    }
}

// ── Categorizer ───────────────────────────────────────────────────────────────

fn categorize(verdict: &VerificationSuiteResult, _result: &ContextResult) -> (ErrorCategory, f64) {
    let timed_out = verdict
        .results
        .iter()
        .any(|r| !r.passed && r.evidence.get("timeout").and_then(|v| v.as_bool()) == Some(true));
    if timed_out {
        (ErrorCategory::Timeout, 1.0)
    } else {
        (ErrorCategory::Unknown, 0.5)
    }
}

// ── Run ───────────────────────────────────────────────────────────────────────

pub async fn run_scenario() -> VerdictResult<()> {
    println!("=== Scenario 3: Slow Verifier ===");
    println!();
    println!("  Suite deadline:  {SUITE_TIMEOUT_MS} ms");
    println!();

    let config = SuiteConfig {
        default_timeout_ms: SUITE_TIMEOUT_MS,
        ..SuiteConfig::default()
    };
    let suite = VerificationSuite::new(config)
        .with_verifier(Arc::new(SchemaVerifier::new()))
        .with_verifier(Arc::new(SmokeVerifier::default()))
        .with_verifier(Arc::new(ArtifactFetchVerifier));
    let harness = Harness::new(suite)?;

    let outcome = harness
        .run(
            TaskRun {
                trace_id: "trace-slow-1",
                task: triage_task("search", "shows_suggestions"),
                first_specialist: "specialist-primary",
                baseline: None,
                categorize,
            },
            &BundlePool,
        )
        .await?;
    print_outcome(&outcome);

    if outcome.action != RetryAction::Accept || outcome.final_specialist != "specialist-performance" {
        println!("  UNEXPECTED: {:?}", outcome);
    }
    Ok(())
}
