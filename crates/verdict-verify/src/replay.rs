//! Consistency check against the previous result for the same task.
//!
//! Catches silent drift between attempts. The consistency score is a weighted
//! Jaccard similarity:
//!
//!   score = 0.6 × J(summary tokens) + 0.4 × J(affordance actions)
//!
//! Summary tokens are the lowercase ASCII alphanumeric runs of length ≥ 3 in
//! the space-joined summary. Affordance actions are compared as whole
//! lowercased strings.
//!
//! With no previous result there is nothing to contradict, so the verifier
//! passes with confidence exactly 0.5: an explicitly neutral verdict.

use std::{collections::HashSet, time::Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map};
use tracing::{debug, warn};

use verdict_contracts::{
    input::{Affordance, VerificationInput},
    verify::VerificationResult,
};
use verdict_core::traits::Verifier;

const SUMMARY_WEIGHT: f64 = 0.6;
const AFFORDANCE_WEIGHT: f64 = 0.4;
const MIN_TOKEN_LEN: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    /// Minimum combined score to pass, inclusive.
    pub min_consistency_threshold: f64,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            min_consistency_threshold: 0.7,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReplayVerifier {
    config: ReplayConfig,
}

impl ReplayVerifier {
    pub const NAME: &'static str = "replay";

    pub fn new(config: ReplayConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Verifier for ReplayVerifier {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn verify(&self, input: &VerificationInput, _timeout_ms: u64) -> VerificationResult {
        let started = Instant::now();
        let threshold = self.config.min_consistency_threshold;

        let Some(previous) = &input.previous_result else {
            let mut evidence = Map::new();
            evidence.insert("baseline".to_string(), json!(false));
            return VerificationResult::new(
                Self::NAME,
                true,
                0.5,
                "no previous result to compare against",
                evidence,
                elapsed_ms(started),
            );
        };

        let current = &input.context_result;
        let summary_similarity =
            jaccard(&summary_tokens(&current.summary), &summary_tokens(&previous.summary));
        let affordance_similarity = jaccard(
            &action_set(&current.affordances),
            &action_set(&previous.affordances),
        );
        let score = SUMMARY_WEIGHT * summary_similarity + AFFORDANCE_WEIGHT * affordance_similarity;
        let passed = score >= threshold;

        let reason = if passed {
            format!("consistent with previous result (score {score:.3} >= {threshold:.2})")
        } else {
            warn!(
                score,
                threshold,
                specialist = %input.metadata.specialist_id,
                "result drifted from previous attempt"
            );
            format!("inconsistent with previous result (score {score:.3} < {threshold:.2})")
        };

        let mut evidence = Map::new();
        evidence.insert("baseline".to_string(), json!(true));
        evidence.insert("summary_similarity".to_string(), json!(summary_similarity));
        evidence.insert("affordance_similarity".to_string(), json!(affordance_similarity));
        evidence.insert("score".to_string(), json!(score));
        evidence.insert("threshold".to_string(), json!(threshold));

        debug!(passed, score, "replay verification complete");
        let confidence = if passed { score } else { 1.0 - score };
        VerificationResult::new(Self::NAME, passed, confidence, reason, evidence, elapsed_ms(started))
    }
}

fn summary_tokens(summary: &[String]) -> HashSet<String> {
    summary
        .join(" ")
        .to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|token| token.len() >= MIN_TOKEN_LEN)
        .map(String::from)
        .collect()
}

fn action_set(affordances: &[Affordance]) -> HashSet<String> {
    affordances.iter().map(|a| a.action.to_lowercase()).collect()
}

/// |A ∩ B| / |A ∪ B|, with two empty sets counting as identical.
fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 1.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}

// ── Tests ─────────────────────────────────────────────────────────────────────
