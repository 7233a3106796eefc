//! The retry policy: turns a failure category and retry depth into a
//! `RetryDecision`.
//!
//! The policy is stateless. States are `(category, retry_depth)` pairs and
//! the caller supplies the depth on every call. Decision algorithm, in order:
//!
//! 1. `depth >= global_max_retries` → `Escalate`.
//! 2. `depth >= category ceiling` → `Escalate`, or `Accept` when escalation
//!    is disabled. `PolicyDegraded` always escalates.
//! 3. Otherwise dispatch on the category to a concrete retry action, target
//!    specialist, and context delta.

use std::path::Path;

use tracing::{debug, warn};

use verdict_contracts::{
    error::{VerdictError, VerdictResult},
    retry::{ContextDelta, DecisionContext, ErrorCategory, RetryAction, RetryDecision},
};

use crate::{
    config::RetryPolicyConfig,
    selector::{RotatingSelector, SpecialistSelector},
};

/// The category-aware retry policy.
///
/// ```rust,ignore
/// use verdict_policy::RetryPolicy;
///
/// let policy = RetryPolicy::from_file(Path::new("config/retry.toml"))?;
/// let decision = policy.decide(&ctx);
/// ```
pub struct RetryPolicy {
    config: RetryPolicyConfig,
    selector: Box<dyn SpecialistSelector>,
}

impl RetryPolicy {
    /// Build a policy whose alternative selector rotates through
    /// `config.alternative_specialists`.
    pub fn new(config: RetryPolicyConfig) -> Self {
        let selector = RotatingSelector::new(config.alternative_specialists.clone());
        Self::with_selector(config, Box::new(selector))
    }

    /// Build a policy with a caller-supplied alternative selector.
    pub fn with_selector(config: RetryPolicyConfig, selector: Box<dyn SpecialistSelector>) -> Self {
        Self { config, selector }
    }

    /// Parse `s` as TOML and build a policy.
    ///
    /// Returns `VerdictError::ConfigError` if the TOML is malformed or does
    /// not match `RetryPolicyConfig`.
    pub fn from_toml_str(s: &str) -> VerdictResult<Self> {
        let config: RetryPolicyConfig = toml::from_str(s).map_err(|e| VerdictError::ConfigError {
            reason: format!("failed to parse retry policy TOML: {e}"),
        })?;
        Ok(Self::new(config))
    }

    /// Read the file at `path` and parse it as retry policy TOML.
    pub fn from_file(path: &Path) -> VerdictResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| VerdictError::ConfigError {
            reason: format!("failed to read retry policy file '{}': {e}", path.display()),
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn config(&self) -> &RetryPolicyConfig {
        &self.config
    }

    /// The ceiling that actually applies to `category`: its own limit,
    /// capped by the global one.
    pub fn effective_max(&self, category: ErrorCategory) -> u32 {
        self.config
            .category_max
            .get(category)
            .min(self.config.global_max_retries)
    }

    /// Decide what to do about one failed attempt.
    pub fn decide(&self, ctx: &DecisionContext) -> RetryDecision {
        let cfg = &self.config;
        let category = ctx.category;
        let depth = ctx.current_retry_depth;
        let category_max = cfg.category_max.get(category);
        let max_retries = self.effective_max(category);

        debug!(
            category = %category,
            retry_depth = depth,
            specialist = %ctx.current_specialist,
            category_max,
            global_max = cfg.global_max_retries,
            "deciding retry"
        );

        // ── Step 1: global ceiling ───────────────────────────────────────────
        if depth >= cfg.global_max_retries {
            warn!(category = %category, retry_depth = depth, "global max retries reached; escalating");
            return RetryDecision::escalate(max_retries, "global max retries reached");
        }

        // ── Step 2: category ceiling ─────────────────────────────────────────
        if depth >= category_max {
            if cfg.enable_escalation || category == ErrorCategory::PolicyDegraded {
                warn!(category = %category, retry_depth = depth, category_max, "category retry limit reached; escalating");
                return RetryDecision::escalate(
                    max_retries,
                    format!("{category} retry limit reached ({depth}/{category_max}); human review required"),
                );
            }
            debug!(category = %category, retry_depth = depth, "category retry limit reached; escalation disabled, accepting");
            return RetryDecision::accept(
                max_retries,
                format!("{category} retry limit reached ({depth}/{category_max}); accepting result as-is"),
            );
        }

        // ── Step 3: category dispatch ────────────────────────────────────────
        let same = ctx.current_specialist.clone();
        let confidence = ctx.category_confidence;
        let retry = |action, target: String, delta: Option<ContextDelta>, reason: String| RetryDecision {
            action,
            target_specialist: Some(target),
            context_delta: delta,
            max_retries,
            reason,
            confidence: clamp_unit(confidence),
        };

        let reroute = |reason: &str| match self.selector.alternative(&ctx.current_specialist) {
            Some(target) => retry(RetryAction::RetryDifferentSpecialist, target, None, reason.to_string()),
            None => {
                warn!(category = %category, specialist = %ctx.current_specialist, "no alternative specialist; escalating");
                RetryDecision::escalate(max_retries, "no alternative specialist available; human review required")
            }
        };

        let decision = match category {
            ErrorCategory::SchemaViolation => retry(
                RetryAction::RetryWithSchema,
                same,
                Some(ContextDelta {
                    include_schema: true,
                    add_hints: vec!["Match the expected output schema exactly.".to_string()],
                    ..ContextDelta::default()
                }),
                "output violated the expected schema; retrying with schema attached".to_string(),
            ),

            ErrorCategory::MissingEvidence => retry(
                RetryAction::RetryExpandContext,
                same,
                Some(ContextDelta {
                    expand_budget_bytes: ctx
                        .current_budget_bytes
                        .unwrap_or(0)
                        .saturating_add(cfg.expand_budget_step_bytes),
                    ..ContextDelta::default()
                }),
                "evidence missing; retrying with an expanded context budget".to_string(),
            ),

            ErrorCategory::FlakyPattern => retry(
                RetryAction::RetryStability,
                cfg.stability_specialist.clone(),
                Some(hints("Prefer deterministic patterns over timing-dependent waits.")),
                "flaky pattern detected; routing to stability specialist".to_string(),
            ),

            ErrorCategory::SelectorIssue => retry(
                RetryAction::RetrySelectorHeal,
                cfg.selector_heal_specialist.clone(),
                Some(hints("Use robust identifiers such as test ids and roles instead of positional selectors.")),
                "selector issue detected; routing to selector-healing specialist".to_string(),
            ),

            ErrorCategory::PolicyDegraded => {
                warn!(retry_depth = depth, "policy degraded; escalating for human review");
                RetryDecision::escalate(max_retries, "policy degraded; human review required")
            }

            ErrorCategory::LowConfidence => reroute("low confidence result; retrying with an alternative specialist"),

            ErrorCategory::Timeout => retry(
                RetryAction::RetryDifferentSpecialist,
                cfg.performance_specialist.clone(),
                None,
                "specialist timed out; routing to performance specialist".to_string(),
            ),

            ErrorCategory::Inconsistent => retry(
                RetryAction::RetryExpandContext,
                same,
                Some(hints("Keep the result consistent with the previous output.")),
                "result inconsistent with previous attempt; retrying with consistency hint".to_string(),
            ),

            ErrorCategory::Unknown => {
                if depth == 0 {
                    reroute("unclassified failure; retrying once with an alternative specialist")
                } else {
                    warn!(retry_depth = depth, "unclassified failure persists; escalating");
                    RetryDecision::escalate(max_retries, "unclassified failure persists after retry")
                }
            }
        };

        debug!(
            category = %category,
            action = ?decision.action,
            target = ?decision.target_specialist,
            "retry decision made"
        );
        decision
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(RetryPolicyConfig::default())
    }
}

fn hints(hint: &str) -> ContextDelta {
    ContextDelta {
        add_hints: vec![hint.to_string()],
        ..ContextDelta::default()
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
