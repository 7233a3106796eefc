//! Verifier output types.
//!
//! Every verifier returns exactly one `VerificationResult` per call. The suite
//! folds them, in registration order, into a `VerificationSuiteResult`.
//! Results are never mutated once built.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// The verdict of a single verifier on a single input.
///
/// `confidence` is certainty about the verdict itself, not how favorable it
/// is: a cleanly detected schema violation fails with confidence 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    /// Name of the verifier that produced this result.
    pub verifier: String,
    pub passed: bool,
    /// Always within `[0.0, 1.0]`.
    pub confidence: f64,
    /// Human-readable explanation. Lists concrete violations on failure.
    pub reason: String,
    /// Structured, verifier-specific detail.
    pub evidence: Map<String, Value>,
    pub duration_ms: f64,
    pub timestamp: DateTime<Utc>,
}

impl VerificationResult {
    /// Build a result, clamping `confidence` into `[0.0, 1.0]`.
    pub fn new(
        verifier: impl Into<String>,
        passed: bool,
        confidence: f64,
        reason: impl Into<String>,
        evidence: Map<String, Value>,
        duration_ms: f64,
    ) -> Self {
        Self {
            verifier: verifier.into(),
            passed,
            confidence: clamp_unit(confidence),
            reason: reason.into(),
            evidence,
            duration_ms,
            timestamp: Utc::now(),
        }
    }

    /// The result a verifier reports when its own machinery fails.
    ///
    /// Failure is reported as data: `passed = false`, `confidence = 0.5`, and
    /// the error text under `evidence.error`.
    pub fn internal_failure(
        verifier: impl Into<String>,
        error: impl Into<String>,
        duration_ms: f64,
    ) -> Self {
        let error = error.into();
        let mut evidence = Map::new();
        evidence.insert("error".to_string(), Value::String(error.clone()));
        Self::new(
            verifier,
            false,
            0.5,
            format!("verifier error: {error}"),
            evidence,
            duration_ms,
        )
    }

    /// The result the suite substitutes for a verifier that missed its deadline.
    pub fn timed_out(verifier: impl Into<String>, timeout_ms: u64) -> Self {
        let mut evidence = Map::new();
        evidence.insert("timeout".to_string(), Value::Bool(true));
        evidence.insert("timeout_ms".to_string(), json!(timeout_ms));
        Self::new(verifier, false, 0.0, "timed out", evidence, timeout_ms as f64)
    }
}

/// The aggregated verdict of one suite invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationSuiteResult {
    /// True only if every entry in `results` passed.
    pub passed: bool,
    /// One entry per active verifier, in registration order.
    pub results: Vec<VerificationResult>,
    /// Suite wall-clock time.
    pub total_duration_ms: f64,
    /// Arithmetic mean of the result confidences; 1.0 when `results` is empty.
    pub average_confidence: f64,
    pub timestamp: DateTime<Utc>,
}

impl VerificationSuiteResult {
    /// Fold per-verifier results into a suite verdict.
    pub fn from_results(results: Vec<VerificationResult>, total_duration_ms: f64) -> Self {
        let passed = results.iter().all(|r| r.passed);
        let average_confidence = if results.is_empty() {
            1.0
        } else {
            results.iter().map(|r| r.confidence).sum::<f64>() / results.len() as f64
        };
        Self {
            passed,
            results,
            total_duration_ms,
            average_confidence,
            timestamp: Utc::now(),
        }
    }

    /// The vacuously passing result for a suite with no active verifiers.
    pub fn vacuous() -> Self {
        Self::from_results(Vec::new(), 0.0)
    }

    /// Names of the verifiers that failed, in registration order.
    pub fn failed_verifiers(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| !r.passed)
            .map(|r| r.verifier.as_str())
            .collect()
    }

    /// Look up the result a named verifier produced in this run.
    pub fn result_for(&self, verifier: &str) -> Option<&VerificationResult> {
        self.results.iter().find(|r| r.verifier == verifier)
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
