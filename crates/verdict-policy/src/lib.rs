//! # verdict-policy
//!
//! The category-aware retry policy for the VERDICT core.
//!
//! ## Overview
//!
//! [`RetryPolicy::decide`] maps an `ErrorCategory` plus the current retry
//! depth to a `RetryDecision`: accept, one of five retry flavors (with a
//! target specialist and context delta), or escalate to human review.
//! Ceilings are per category and globally capped. The policy holds no
//! mutable state, so one instance can serve every task in the process.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use verdict_contracts::retry::{DecisionContext, ErrorCategory};
//! use verdict_policy::RetryPolicy;
//!
//! let policy = RetryPolicy::default();
//! let decision = policy.decide(&DecisionContext::new(
//!     ErrorCategory::SchemaViolation, 1, "specialist-a", 0.9,
//! ));
//! ```
//!
//! ## Rerouting
//!
//! `LowConfidence` and first-attempt `Unknown` failures go to "another"
//! specialist chosen by a [`SpecialistSelector`]. The default
//! [`RotatingSelector`] walks `alternative_specialists`; deployments can
//! inject their own through [`RetryPolicy::with_selector`].

pub mod config;
pub mod engine;
pub mod selector;

pub use config::{CategoryLimits, RetryPolicyConfig};
pub use engine::RetryPolicy;
pub use selector::{RotatingSelector, SpecialistSelector};

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use verdict_contracts::{
        error::VerdictError,
        retry::{DecisionContext, ErrorCategory, RetryAction},
    };

    use crate::{RetryPolicy, RetryPolicyConfig, SpecialistSelector};

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn ctx(category: ErrorCategory, depth: u32) -> DecisionContext {
        DecisionContext::new(category, depth, "specialist-a", 0.9)
    }

    // ── Worked examples ───────────────────────────────────────────────────────

    #[test]
    fn schema_violation_retries_same_specialist_then_escalates() {
        let policy = RetryPolicy::default();

        let first = policy.decide(&ctx(ErrorCategory::SchemaViolation, 1));
        assert_eq!(first.action, RetryAction::RetryWithSchema);
        assert_eq!(first.target_specialist.as_deref(), Some("specialist-a"));
        assert_eq!(first.max_retries, 2);
        let delta = first.context_delta.unwrap();
        assert!(delta.include_schema);
        assert!(!delta.add_hints.is_empty());
        assert!((first.confidence - 0.9).abs() < 1e-9);

        let second = policy.decide(&ctx(ErrorCategory::SchemaViolation, 2));
        assert_eq!(second.action, RetryAction::Escalate);
        assert!(second.target_specialist.is_none());
    }

    #[test]
    fn policy_degraded_escalates_immediately() {
        let policy = RetryPolicy::default();
        let decision = policy.decide(&ctx(ErrorCategory::PolicyDegraded, 0));
        assert_eq!(decision.action, RetryAction::Escalate);
        assert_eq!(decision.max_retries, 0);
    }

    #[test]
    fn policy_degraded_escalates_even_with_escalation_disabled() {
        let policy = RetryPolicy::new(RetryPolicyConfig {
            enable_escalation: false,
            ..RetryPolicyConfig::default()
        });
        let decision = policy.decide(&ctx(ErrorCategory::PolicyDegraded, 0));
        assert_eq!(decision.action, RetryAction::Escalate);
    }

    #[test]
    fn policy_degraded_escalates_even_with_a_positive_ceiling() {
        let mut config = RetryPolicyConfig::default();
        config.category_max.set(ErrorCategory::PolicyDegraded, 2);
        let decision = RetryPolicy::new(config).decide(&ctx(ErrorCategory::PolicyDegraded, 0));
        assert_eq!(decision.action, RetryAction::Escalate);
    }

    // ── Category dispatch ─────────────────────────────────────────────────────

    #[test]
    fn missing_evidence_expands_budget() {
        let policy = RetryPolicy::default();

        let fresh = policy.decide(&ctx(ErrorCategory::MissingEvidence, 0));
        assert_eq!(fresh.action, RetryAction::RetryExpandContext);
        assert_eq!(fresh.target_specialist.as_deref(), Some("specialist-a"));
        assert_eq!(fresh.context_delta.unwrap().expand_budget_bytes, 10_000);

        let grown = policy.decide(&ctx(ErrorCategory::MissingEvidence, 1).with_budget(20_000));
        assert_eq!(grown.context_delta.unwrap().expand_budget_bytes, 30_000);
    }

    #[test]
    fn flaky_pattern_routes_to_stability_specialist() {
        let decision = RetryPolicy::default().decide(&ctx(ErrorCategory::FlakyPattern, 0));
        assert_eq!(decision.action, RetryAction::RetryStability);
        assert_eq!(decision.target_specialist.as_deref(), Some("specialist-stability"));
        assert!(decision.context_delta.unwrap().add_hints[0].contains("deterministic"));
    }

    #[test]
    fn selector_issue_routes_to_selector_healer() {
        let decision = RetryPolicy::default().decide(&ctx(ErrorCategory::SelectorIssue, 1));
        assert_eq!(decision.action, RetryAction::RetrySelectorHeal);
        assert_eq!(decision.target_specialist.as_deref(), Some("specialist-selector-heal"));
    }

    #[test]
    fn low_confidence_uses_alternative_specialist() {
        let policy = RetryPolicy::new(RetryPolicyConfig {
            alternative_specialists: vec!["specialist-a".to_string(), "specialist-b".to_string()],
            ..RetryPolicyConfig::default()
        });
        let decision = policy.decide(&ctx(ErrorCategory::LowConfidence, 0));
        assert_eq!(decision.action, RetryAction::RetryDifferentSpecialist);
        assert_eq!(decision.target_specialist.as_deref(), Some("specialist-b"));
    }

    #[test]
    fn timeout_routes_to_performance_specialist_once() {
        let policy = RetryPolicy::default();

        let first = policy.decide(&ctx(ErrorCategory::Timeout, 0));
        assert_eq!(first.action, RetryAction::RetryDifferentSpecialist);
        assert_eq!(first.target_specialist.as_deref(), Some("specialist-performance"));

        let second = policy.decide(&ctx(ErrorCategory::Timeout, 1));
        assert_eq!(second.action, RetryAction::Escalate);
    }

    #[test]
    fn inconsistent_adds_consistency_hint() {
        let decision = RetryPolicy::default().decide(&ctx(ErrorCategory::Inconsistent, 0));
        assert_eq!(decision.action, RetryAction::RetryExpandContext);
        assert_eq!(decision.target_specialist.as_deref(), Some("specialist-a"));
        assert!(decision.context_delta.unwrap().add_hints[0].contains("consistent"));
    }

    #[test]
    fn unknown_retries_once_then_escalates() {
        let policy = RetryPolicy::default();

        let first = policy.decide(&ctx(ErrorCategory::Unknown, 0));
        assert_eq!(first.action, RetryAction::RetryDifferentSpecialist);
        assert_ne!(first.target_specialist.as_deref(), Some("specialist-a"));

        assert_eq!(policy.decide(&ctx(ErrorCategory::Unknown, 1)).action, RetryAction::Escalate);
    }

    #[test]
    fn unknown_escalates_after_first_attempt_even_with_higher_ceiling() {
        let mut config = RetryPolicyConfig::default();
        config.category_max.set(ErrorCategory::Unknown, 3);
        let decision = RetryPolicy::new(config).decide(&ctx(ErrorCategory::Unknown, 1));
        assert_eq!(decision.action, RetryAction::Escalate);
    }

    // ── Ceilings ──────────────────────────────────────────────────────────────

    #[test]
    fn global_ceiling_caps_category_ceiling() {
        let policy = RetryPolicy::default();
        // MissingEvidence allows 3, global allows 3.
        assert!(policy.decide(&ctx(ErrorCategory::MissingEvidence, 2)).is_retry());
        let at_global = policy.decide(&ctx(ErrorCategory::MissingEvidence, 3));
        assert_eq!(at_global.action, RetryAction::Escalate);
        assert_eq!(at_global.reason, "global max retries reached");

        let tight = RetryPolicy::new(RetryPolicyConfig {
            global_max_retries: 1,
            ..RetryPolicyConfig::default()
        });
        assert_eq!(tight.effective_max(ErrorCategory::MissingEvidence), 1);
        assert_eq!(
            tight.decide(&ctx(ErrorCategory::MissingEvidence, 1)).action,
            RetryAction::Escalate
        );
    }

    #[test]
    fn exhaustion_accepts_when_escalation_disabled() {
        let policy = RetryPolicy::new(RetryPolicyConfig {
            enable_escalation: false,
            ..RetryPolicyConfig::default()
        });
        let decision = policy.decide(&ctx(ErrorCategory::SchemaViolation, 2));
        assert_eq!(decision.action, RetryAction::Accept);
        assert!(decision.reason.contains("accepting"));
    }

    #[test]
    fn global_ceiling_escalates_even_when_escalation_disabled() {
        let policy = RetryPolicy::new(RetryPolicyConfig {
            enable_escalation: false,
            ..RetryPolicyConfig::default()
        });
        let decision = policy.decide(&ctx(ErrorCategory::MissingEvidence, 3));
        assert_eq!(decision.action, RetryAction::Escalate);
    }

    #[test]
    fn confidence_is_clamped() {
        let decision = RetryPolicy::default().decide(&DecisionContext::new(
            ErrorCategory::FlakyPattern,
            0,
            "specialist-a",
            4.2,
        ));
        assert_eq!(decision.confidence, 1.0);
    }

    #[test]
    fn reroute_without_alternative_escalates() {
        let policy = RetryPolicy::new(RetryPolicyConfig {
            alternative_specialists: vec!["specialist-a".to_string()],
            ..RetryPolicyConfig::default()
        });

        for category in [ErrorCategory::LowConfidence, ErrorCategory::Unknown] {
            let decision = policy.decide(&ctx(category, 0));
            assert_eq!(decision.action, RetryAction::Escalate, "{category}");
            assert_eq!(decision.target_specialist, None);
        }
    }

    // ── Injected selector ─────────────────────────────────────────────────────

    struct FixedSelector(&'static str);

    impl SpecialistSelector for FixedSelector {
        fn alternative(&self, _current: &str) -> Option<String> {
            Some(self.0.to_string())
        }
    }

    #[test]
    fn injected_selector_is_used() {
        let policy = RetryPolicy::with_selector(
            RetryPolicyConfig::default(),
            Box::new(FixedSelector("specialist-z")),
        );
        let decision = policy.decide(&ctx(ErrorCategory::LowConfidence, 0));
        assert_eq!(decision.target_specialist.as_deref(), Some("specialist-z"));
    }

    // ── TOML loading ──────────────────────────────────────────────────────────

    #[test]
    fn empty_toml_yields_defaults() {
        let policy = RetryPolicy::from_toml_str("").unwrap();
        assert_eq!(policy.config(), &RetryPolicyConfig::default());
    }

    #[test]
    fn toml_overrides_selected_fields() {
        let toml = r#"
            global_max_retries = 5
            stability_specialist = "specialist-stable-v2"

            [category_max]
            schema_violation = 4
        "#;

        let policy = RetryPolicy::from_toml_str(toml).unwrap();
        assert_eq!(policy.config().global_max_retries, 5);
        assert_eq!(policy.effective_max(ErrorCategory::SchemaViolation), 4);
        // Unlisted categories keep their defaults.
        assert_eq!(policy.effective_max(ErrorCategory::Timeout), 1);
        assert_eq!(
            policy.decide(&ctx(ErrorCategory::FlakyPattern, 0)).target_specialist.as_deref(),
            Some("specialist-stable-v2")
        );
    }

    #[test]
    fn toml_parse_error() {
        let result = RetryPolicy::from_toml_str("global_max_retries = \"many\"");
        match result {
            Err(VerdictError::ConfigError { reason }) => {
                assert!(reason.contains("failed to parse retry policy TOML"), "got: {reason}");
            }
            Err(other) => panic!("expected ConfigError, got {other:?}"),
            Ok(_) => panic!("expected ConfigError, got a policy"),
        }
    }

    // ── Properties ────────────────────────────────────────────────────────────

    fn any_category() -> impl Strategy<Value = ErrorCategory> {
        prop::sample::select(ErrorCategory::ALL.to_vec())
    }

    proptest! {
        /// Below the effective ceiling a category never escalates (except the
        /// two categories that escalate by rule); at or above it, it always
        /// stops retrying.
        #[test]
        fn ceiling_is_monotonic(category in any_category(), depth in 0u32..8) {
            let policy = RetryPolicy::default();
            let decision = policy.decide(&ctx(category, depth));
            let ceiling = policy.effective_max(category);

            if depth >= ceiling {
                prop_assert!(decision.is_terminal());
            } else {
                let escalates_by_rule = category == ErrorCategory::PolicyDegraded
                    || (category == ErrorCategory::Unknown && depth > 0);
                if !escalates_by_rule {
                    prop_assert!(decision.is_retry(), "{category} at {depth}: {:?}", decision.action);
                }
            }
        }

        #[test]
        fn max_retries_reports_effective_ceiling(category in any_category(), depth in 0u32..8) {
            let policy = RetryPolicy::default();
            prop_assert_eq!(policy.decide(&ctx(category, depth)).max_retries, policy.effective_max(category));
        }
    }
}
