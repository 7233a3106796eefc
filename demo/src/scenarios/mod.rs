//! Demo scenarios for the VERDICT verification-and-retry core.
//!
//! Every scenario drives real VERDICT components (verification suite, retry
//! policy, publish gate) against in-process mock specialists. The shared
//! [`Harness`] runs the attempt loop:
//!
//!   specialist responds → suite verifies → policy decides → gate authorizes
//!
//! until the result is accepted, escalated, or refused at the publish
//! boundary.

pub mod duplicate_publish;
pub mod flaky_selector;
pub mod schema_retry;
pub mod slow_verifier;

use std::sync::Arc;

use verdict_contracts::{
    error::{VerdictError, VerdictResult},
    input::{ContextResult, InputMetadata, PreviousResult, TaskSpec, VerificationInput},
    retry::{ContextDelta, DecisionContext, ErrorCategory, RetryAction, RetryDecision},
    verify::VerificationSuiteResult,
};
use verdict_core::VerificationSuite;
use verdict_guard::{InMemoryDedupeStore, KeyInput, PublishGate, RetryLimitGuard};
use verdict_policy::RetryPolicy;

use crate::mock_specialists::SpecialistPool;

// ── Policy TOML ───────────────────────────────────────────────────────────────

/// Embedded retry policy shared by every scenario.
const RETRY_POLICY: &str = include_str!("../../config/retry_policy.toml");

pub fn load_policy() -> VerdictResult<RetryPolicy> {
    RetryPolicy::from_toml_str(RETRY_POLICY)
}

pub fn new_message_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Maps a failed verdict and the result that produced it to a category and
/// the categorizer's confidence in it. Stands in for the upstream categorizer.
pub type Categorizer = fn(&VerificationSuiteResult, &ContextResult) -> (ErrorCategory, f64);

/// One task to drive through the attempt loop.
pub struct TaskRun<'a> {
    pub trace_id: &'a str,
    pub task: TaskSpec,
    pub first_specialist: &'a str,
    /// Replay baseline from an earlier accepted run, if any.
    pub baseline: Option<PreviousResult>,
    pub categorize: Categorizer,
}

/// How a task run ended.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub action: RetryAction,
    /// Specialist attempts made, including the first.
    pub attempts: u32,
    pub final_specialist: String,
}

/// Suite, policy and gate wired together.
pub struct Harness {
    pub suite: VerificationSuite,
    pub policy: RetryPolicy,
    pub gate: PublishGate,
}

impl Harness {
    /// Build a harness whose gate reads its ceilings from the environment
    /// and records keys in a fresh in-memory store.
    pub fn new(suite: VerificationSuite) -> VerdictResult<Self> {
        let guard = RetryLimitGuard::from_env()?;
        Ok(Self {
            suite,
            policy: load_policy()?,
            gate: PublishGate::new(guard, Arc::new(InMemoryDedupeStore::new())),
        })
    }

    pub async fn run(&self, run: TaskRun<'_>, pool: &dyn SpecialistPool) -> VerdictResult<Outcome> {
        let mut specialist = run.first_specialist.to_string();
        let mut delta: Option<ContextDelta> = None;
        let mut depth: u32 = 0;

        loop {
            let result = pool.respond(&specialist, delta.as_ref());
            let mut input = VerificationInput::new(
                result.clone(),
                run.task.clone(),
                InputMetadata {
                    specialist_id: specialist.clone(),
                    message_id: new_message_id(),
                    retry_depth: depth,
                },
            );
            if let Some(baseline) = &run.baseline {
                input = input.with_previous_result(baseline.clone());
            }

            println!("  Attempt {} : {}", depth + 1, specialist);
            let verdict = self.suite.run(input).await;
            print_verdict(&verdict);

            let reason_codes: Vec<String> = verdict.failed_verifiers().into_iter().map(str::to_string).collect();
            let key_input = KeyInput {
                trace_id: run.trace_id,
                task: &run.task,
                attempt_no: depth,
                reason_codes: &reason_codes,
            };

            if verdict.passed {
                let key = self.gate.authorize_notice(&key_input, &new_message_id())?;
                println!("  Decision:        accept (notice key {}…)", &key.key[..12]);
                println!();
                return Ok(Outcome {
                    action: RetryAction::Accept,
                    attempts: depth + 1,
                    final_specialist: specialist,
                });
            }

            let (category, confidence) = (run.categorize)(&verdict, &result);
            let decision = self.policy.decide(&DecisionContext::new(category, depth, &specialist, confidence));
            print_decision(category, &decision);

            if decision.is_terminal() {
                let key = self.gate.authorize_notice(&key_input, &new_message_id())?;
                println!("  Notice key:      {}…", &key.key[..12]);
                println!();
                return Ok(Outcome {
                    action: decision.action,
                    attempts: depth + 1,
                    final_specialist: specialist,
                });
            }

            match self.gate.authorize_retry(&key_input, category, &new_message_id()) {
                Ok(key) => println!("  Retry key:       {}…", &key.key[..12]),
                Err(VerdictError::RetryLimitExceeded { max_attempts, .. }) => {
                    println!("  Publish gate:    REFUSED (ceiling {max_attempts} reached); escalating");
                    println!();
                    return Ok(Outcome {
                        action: RetryAction::Escalate,
                        attempts: depth + 1,
                        final_specialist: specialist,
                    });
                }
                Err(e) => return Err(e),
            }
            println!();

            if let Some(target) = decision.target_specialist {
                specialist = target;
            }
            delta = decision.context_delta;
            depth += 1;
        }
    }
}

// ── Printing ──────────────────────────────────────────────────────────────────

pub fn print_verdict(verdict: &VerificationSuiteResult) {
    println!(
        "  Verification:    {} (avg confidence {:.2}, {:.1} ms)",
        if verdict.passed { "PASS" } else { "FAIL" },
        verdict.average_confidence,
        verdict.total_duration_ms
    );
    for r in &verdict.results {
        println!(
            "    [{:<14}] {} {:.2}  {}",
            r.verifier,
            if r.passed { "pass" } else { "FAIL" },
            r.confidence,
            r.reason
        );
    }
}

pub fn print_decision(category: ErrorCategory, decision: &RetryDecision) {
    println!("  Category:        {category}");
    println!(
        "  Decision:        {:?} → {} (max retries {})",
        decision.action,
        decision.target_specialist.as_deref().unwrap_or("-"),
        decision.max_retries
    );
    println!("  Reason:          {}", decision.reason);
    if let Some(delta) = &decision.context_delta {
        if delta.include_schema {
            println!("  Delta:           include schema");
        }
        if delta.expand_budget_bytes > 0 {
            println!("  Delta:           budget → {} bytes", delta.expand_budget_bytes);
        }
        for hint in &delta.add_hints {
            println!("  Hint:            {hint}");
        }
    }
}

pub fn print_outcome(outcome: &Outcome) {
    println!(
        "  Outcome: {:?} after {} attempt(s), last specialist {}",
        outcome.action, outcome.attempts, outcome.final_specialist
    );
    println!();
}
