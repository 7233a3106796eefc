//! The verification suite: runs every active verifier against one candidate
//! result under a shared deadline.
//!
//! Pipeline for one call:
//!
//!   select active → spawn each verifier → race each against the deadline
//!   → substitute failures for the losers → fold in registration order
//!
//! Each `verify` future is driven on its own blocking-pool thread through the
//! runtime handle, so a verifier that blocks its thread (a synchronous sleep,
//! a long CPU loop) cannot stall the race or the runtime's timer. A result
//! that arrives after the deadline counts as timed out even if the race did
//! not observe it in time.
//!
//! A verifier that loses the race is not aborted. Its thread keeps running
//! and its eventual result is dropped; the suite only stops waiting for it.
//! One slow or panicking verifier can therefore never block or crash a suite
//! invocation.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use verdict_contracts::{
    input::VerificationInput,
    verify::{VerificationResult, VerificationSuiteResult},
};

use crate::traits::Verifier;

/// Suite-level settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Per-verifier deadline, in milliseconds.
    pub default_timeout_ms: u64,
    /// When set, only verifiers whose name appears here run.
    pub enabled_verifiers: Option<Vec<String>>,
}

impl SuiteConfig {
    pub const DEFAULT_TIMEOUT_MS: u64 = 2000;
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: Self::DEFAULT_TIMEOUT_MS,
            enabled_verifiers: None,
        }
    }
}

/// The registry of verifiers plus the policy for running them.
pub struct VerificationSuite {
    verifiers: Vec<Arc<dyn Verifier>>,
    config: SuiteConfig,
}

impl VerificationSuite {
    /// Create a suite with no verifiers registered.
    pub fn new(config: SuiteConfig) -> Self {
        Self {
            verifiers: Vec::new(),
            config,
        }
    }

    /// Append a verifier. Registration order is result order.
    pub fn register(&mut self, verifier: Arc<dyn Verifier>) {
        self.verifiers.push(verifier);
    }

    /// Builder form of `register`.
    pub fn with_verifier(mut self, verifier: Arc<dyn Verifier>) -> Self {
        self.register(verifier);
        self
    }

    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    /// Names of every registered verifier, in registration order.
    pub fn registered_verifier_names(&self) -> Vec<&str> {
        self.verifiers.iter().map(|v| v.name()).collect()
    }

    /// Names of the verifiers the allow-list lets through, in registration order.
    pub fn active_verifier_names(&self) -> Vec<&str> {
        self.active_verifiers().iter().map(|v| v.name()).collect()
    }

    fn active_verifiers(&self) -> Vec<&Arc<dyn Verifier>> {
        match &self.config.enabled_verifiers {
            None => self.verifiers.iter().collect(),
            Some(allowed) => self
                .verifiers
                .iter()
                .filter(|v| allowed.iter().any(|name| name == v.name()))
                .collect(),
        }
    }

    /// Run every active verifier concurrently against `input`.
    ///
    /// With no active verifiers the result passes vacuously: an empty check
    /// set must not block the pipeline. Otherwise `passed` is the conjunction
    /// of all real and substituted results, and the wall-clock time is bounded
    /// by the per-verifier deadline regardless of how many verifiers run.
    pub async fn run(&self, input: VerificationInput) -> VerificationSuiteResult {
        let started = Instant::now();
        let active = self.active_verifiers();

        if active.is_empty() {
            info!(
                registered = self.verifiers.len(),
                "no active verifiers; suite passes vacuously"
            );
            return VerificationSuiteResult::vacuous();
        }

        let timeout_ms = self.config.default_timeout_ms;
        let deadline = Duration::from_millis(timeout_ms);
        let input = Arc::new(input);

        debug!(
            active = active.len(),
            timeout_ms,
            message_id = %input.metadata.message_id,
            "verification suite starting"
        );

        let runtime = Handle::current();
        let races = active.into_iter().map(|verifier| {
            let name = verifier.name().to_string();
            let verifier = Arc::clone(verifier);
            let input = Arc::clone(&input);
            let runtime = runtime.clone();

            async move {
                // Off the async workers: the thread outlives a lost race and
                // may block without holding up the deadline.
                let handle = tokio::task::spawn_blocking(move || {
                    let result = runtime.block_on(verifier.verify(&input, timeout_ms));
                    (result, started.elapsed())
                });

                match tokio::time::timeout(deadline, handle).await {
                    Ok(Ok((result, finished_at))) if finished_at <= deadline => result,
                    Ok(Ok((_, finished_at))) => {
                        warn!(
                            verifier = %name,
                            timeout_ms,
                            finished_ms = finished_at.as_secs_f64() * 1000.0,
                            "verifier finished after deadline; substituting failure"
                        );
                        VerificationResult::timed_out(name, timeout_ms)
                    }
                    Ok(Err(join_error)) => {
                        warn!(verifier = %name, error = %join_error, "verifier task panicked");
                        let mut result = VerificationResult::internal_failure(
                            name,
                            format!("verifier task failed: {join_error}"),
                            elapsed_ms(started),
                        );
                        result
                            .evidence
                            .insert("panicked".to_string(), Value::Bool(true));
                        result
                    }
                    Err(_) => {
                        warn!(verifier = %name, timeout_ms, "verifier missed deadline; substituting failure");
                        VerificationResult::timed_out(name, timeout_ms)
                    }
                }
            }
        });

        // join_all yields in input order, not completion order.
        let results = join_all(races).await;
        let suite = VerificationSuiteResult::from_results(results, elapsed_ms(started));

        info!(
            passed = suite.passed,
            verifiers = suite.results.len(),
            failed = ?suite.failed_verifiers(),
            average_confidence = suite.average_confidence,
            total_duration_ms = suite.total_duration_ms,
            "verification suite complete"
        );

        suite
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}

// ── Tests ─────────────────────────────────────────────────────────────────────
