//! Scenario 2: Flaky Pattern, then Selector Issue
//!
//! The first triage leaks tool-failure wording and blames a fixed sleep. The
//! categorizer reads it as a flaky pattern and the policy routes to the
//! stability specialist. That specialist's answer points at a broken
//! selector, so the next retry goes to the selector-healing specialist,
//! whose answer passes.
//!
//!   specialist-primary → specialist-stability → specialist-selector-heal

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

struct QaPool;

impl SpecialistPool for QaPool {
    fn respond(&self, specialist_id: &str, _delta: Option<&ContextDelta>) -> ContextResult {
        match specialist_id {
            "specialist-stability" => result(
                &["Unable to locate selector #pay-btn once the waits were made deterministic"],
                &[("audit pay button locator", "the id no longer exists in the page")],
            ),
            "specialist-selector-heal" => result(
                &[
                    "Pay button moved to a data-testid attribute in the checkout redesign",
                    "Positional selector #pay-btn matches nothing after the redesign",
                ],
                &[
                    ("use getByTestId('pay-button')", "test ids survive layout changes"),
                    ("remove the fixed sleep", "the locator wait already covers rendering"),
                ],
            ),
            _ => result(
                &["Test could not click the pay button after a fixed sleep of 3 seconds"],
                &[("increase the sleep", "the button sometimes renders late")],
            ),
        }
    }
}

// ── Categorizer ───────────────────────────────────────────────────────────────

const FLAKY_MARKERS: [&str; 3] = ["sleep", "race", "timing"];
const SELECTOR_MARKERS: [&str; 3] = ["selector", "locator", "xpath"];

/// Keyword categorizer over the failed result's summary.
fn categorize(_verdict: &VerificationSuiteResult, result: &ContextResult) -> (ErrorCategory, f64) {
    let text = result.summary.join(" ").to_lowercase();
    if FLAKY_MARKERS.iter().any(|m| text.contains(m)) {
        (ErrorCategory::FlakyPattern, 0.8)
    } else if SELECTOR_MARKERS.iter().any(|m| text.contains(m)) {
        (ErrorCategory::SelectorIssue, 0.85)
    } else {
        (ErrorCategory::Unknown, 0.5)
    }
}

// ── Run ───────────────────────────────────────────────────────────────────────

pub async fn run_scenario() -> VerdictResult<()> {
    println!("=== Scenario 2: Flaky Pattern → Selector Heal ===");
    println!();

    let suite = VerificationSuite::new(SuiteConfig::default())
        .with_verifier(Arc::new(SchemaVerifier::new()))
        .with_verifier(Arc::new(SmokeVerifier::default()))
        .with_verifier(Arc::new(ReplayVerifier::default()));
    let harness = Harness::new(suite)?;

    let outcome = harness
        .run(
            TaskRun {
                trace_id: "trace-flaky-1",
                task: triage_task("checkout", "pays_with_paypal"),
                first_specialist: "specialist-primary",
                baseline: None,
                categorize,
            },
            &QaPool,
        )
        .await?;
    print_outcome(&outcome);

    if outcome.action != RetryAction::Accept || outcome.final_specialist != "specialist-selector-heal" {
        println!("  UNEXPECTED: {:?}", outcome);
    }
    Ok(())
}
