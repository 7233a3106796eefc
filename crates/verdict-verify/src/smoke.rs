//! Bounded sanity checks on a context result.
//!
//! The smoke verifier is deterministic and side-effect free. It looks only at
//! the candidate result itself: item counts, item lengths, blank fields, and
//! wording that shows a specialist leaked an internal failure ("error",
//! "could not", ...) into user-facing output.
//!
//! Every rule runs regardless of earlier failures; `evidence.failures` lists
//! all violated rules.

use std::time::Instant;

use async_trait::async_trait;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use verdict_contracts::{
    error::{VerdictError, VerdictResult},
    input::VerificationInput,
    verify::VerificationResult,
};
use verdict_core::traits::Verifier;

/// Bounds and patterns for the smoke checks. All ranges are inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmokeConfig {
    pub min_summary_items: usize,
    pub max_summary_items: usize,
    pub min_affordances: usize,
    pub max_affordances: usize,
    /// Per summary item, in characters.
    pub min_summary_length: usize,
    pub max_summary_length: usize,
    /// Case-insensitive regular expressions matched against the joined summary.
    pub forbidden_patterns: Vec<String>,
}

impl Default for SmokeConfig {
    fn default() -> Self {
        Self {
            min_summary_items: 1,
            max_summary_items: 20,
            min_affordances: 1,
            max_affordances: 10,
            min_summary_length: 10,
            max_summary_length: 500,
            forbidden_patterns: default_forbidden_patterns(),
        }
    }
}

fn default_forbidden_patterns() -> Vec<String> {
    [
        r"\berrors?\b",
        r"\bexceptions?\b",
        r"\bfailed to\b",
        r"\bcould not\b",
        r"\bunable to\b",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// A single violated smoke rule.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SmokeFailure {
    rule: &'static str,
    message: String,
}

/// The smoke verifier.
pub struct SmokeVerifier {
    config: SmokeConfig,
    forbidden: Vec<Regex>,
}

impl SmokeVerifier {
    pub const NAME: &'static str = "smoke";

    /// Build a verifier, compiling every forbidden pattern up front.
    ///
    /// Returns `VerdictError::ConfigError` naming the first pattern that is
    /// not a valid regular expression.
    pub fn new(config: SmokeConfig) -> VerdictResult<Self> {
        let forbidden = config
            .forbidden_patterns
            .iter()
            .map(String::as_str)
            .map(compile)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|(pattern, e)| VerdictError::ConfigError {
                reason: format!("invalid forbidden pattern '{pattern}': {e}"),
            })?;
        Ok(Self { config, forbidden })
    }

    pub fn config(&self) -> &SmokeConfig {
        &self.config
    }

    fn check(&self, input: &VerificationInput) -> Vec<SmokeFailure> {
        let cfg = &self.config;
        let result = &input.context_result;
        let mut failures = Vec::new();

        let summary_count = result.summary.len();
        if summary_count < cfg.min_summary_items || summary_count > cfg.max_summary_items {
            failures.push(SmokeFailure {
                rule: "summary_count",
                message: format!(
                    "summary has {summary_count} items, expected {}..={}",
                    cfg.min_summary_items, cfg.max_summary_items
                ),
            });
        }

        let affordance_count = result.affordances.len();
        if affordance_count < cfg.min_affordances || affordance_count > cfg.max_affordances {
            failures.push(SmokeFailure {
                rule: "affordance_count",
                message: format!(
                    "{affordance_count} affordances, expected {}..={}",
                    cfg.min_affordances, cfg.max_affordances
                ),
            });
        }

        for (idx, item) in result.summary.iter().enumerate() {
            let len = item.chars().count();
            if len < cfg.min_summary_length {
                failures.push(SmokeFailure {
                    rule: "summary_length",
                    message: format!(
                        "summary[{idx}] too short: {len} chars, minimum {}",
                        cfg.min_summary_length
                    ),
                });
            } else if len > cfg.max_summary_length {
                failures.push(SmokeFailure {
                    rule: "summary_length",
                    message: format!(
                        "summary[{idx}] too long: {len} chars, maximum {}",
                        cfg.max_summary_length
                    ),
                });
            }

            if item.trim().is_empty() {
                failures.push(SmokeFailure {
                    rule: "summary_blank",
                    message: format!("summary[{idx}] is blank"),
                });
            }
        }

        let joined = result.summary.join(" ");
        for (pattern, regex) in cfg.forbidden_patterns.iter().zip(&self.forbidden) {
            if let Some(found) = regex.find(&joined) {
                failures.push(SmokeFailure {
                    rule: "forbidden_pattern",
                    message: format!(
                        "summary contains '{}' (pattern {pattern})",
                        found.as_str()
                    ),
                });
            }
        }

        for (idx, affordance) in result.affordances.iter().enumerate() {
            if affordance.action.trim().is_empty() {
                failures.push(SmokeFailure {
                    rule: "affordance_blank",
                    message: format!("affordances[{idx}].action is blank"),
                });
            }
            if affordance.why.trim().is_empty() {
                failures.push(SmokeFailure {
                    rule: "affordance_blank",
                    message: format!("affordances[{idx}].why is blank"),
                });
            }
        }

        failures
    }
}

impl Default for SmokeVerifier {
    fn default() -> Self {
        let config = SmokeConfig::default();
        // The built-in patterns are literals known to compile.
        let forbidden = config
            .forbidden_patterns
            .iter()
            .filter_map(|p| compile(p).ok())
            .collect();
        Self { config, forbidden }
    }
}

fn compile(pattern: &str) -> Result<Regex, (String, regex::Error)> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| (pattern.to_string(), e))
}

#[async_trait]
impl Verifier for SmokeVerifier {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn verify(&self, input: &VerificationInput, _timeout_ms: u64) -> VerificationResult {
        let started = Instant::now();
        let failures = self.check(input);
        let passed = failures.is_empty();

        let reason = if passed {
            "all smoke checks passed".to_string()
        } else {
            let details = failures
                .iter()
                .map(|f| f.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            warn!(
                failure_count = failures.len(),
                specialist = %input.metadata.specialist_id,
                "smoke checks failed"
            );
            format!("smoke checks failed: {details}")
        };

        let mut evidence = Map::new();
        evidence.insert(
            "failures".to_string(),
            Value::Array(
                failures
                    .iter()
                    .map(|f| json!({ "rule": f.rule, "message": f.message }))
                    .collect(),
            ),
        );
        evidence.insert(
            "summary_items".to_string(),
            json!(input.context_result.summary.len()),
        );
        evidence.insert(
            "affordances".to_string(),
            json!(input.context_result.affordances.len()),
        );

        debug!(passed, "smoke verification complete");
        let duration_ms = started.elapsed().as_secs_f64() * 1000.0;
        VerificationResult::new(Self::NAME, passed, 1.0, reason, evidence, duration_ms)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
