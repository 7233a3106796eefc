//! # verdict-contracts
//!
//! Shared types, decision shapes, and error contracts for the VERDICT
//! verification-and-retry core.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate, only data definitions, small constructors, and error types.

pub mod error;
pub mod idempotency;
pub mod input;
pub mod retry;
pub mod verify;

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use serde_json::{json, Map};

    use super::*;
    use error::VerdictError;
    use input::{Affordance, ContextResult, InputMetadata, PreviousResult, TaskSpec, VerificationInput};
    use retry::{ErrorCategory, RetryAction, RetryDecision, RetryLimitConfig};
    use verify::{VerificationResult, VerificationSuiteResult};

    fn result(name: &str, passed: bool, confidence: f64) -> VerificationResult {
        VerificationResult::new(name, passed, confidence, "test", Map::new(), 1.0)
    }

    // ── VerificationSuiteResult ──────────────────────────────────────────────

    #[test]
    fn suite_result_is_conjunction_of_results() {
        let all_pass = VerificationSuiteResult::from_results(
            vec![result("a", true, 1.0), result("b", true, 0.5)],
            3.0,
        );
        assert!(all_pass.passed);
        assert!((all_pass.average_confidence - 0.75).abs() < 1e-9);

        let one_fail = VerificationSuiteResult::from_results(
            vec![result("a", true, 1.0), result("b", false, 1.0), result("c", true, 1.0)],
            3.0,
        );
        assert!(!one_fail.passed);
        assert_eq!(one_fail.failed_verifiers(), vec!["b"]);
    }

    #[test]
    fn vacuous_suite_result_passes_with_full_confidence() {
        let vacuous = VerificationSuiteResult::vacuous();
        assert!(vacuous.passed);
        assert!(vacuous.results.is_empty());
        assert_eq!(vacuous.average_confidence, 1.0);
    }

    #[test]
    fn result_for_finds_by_name() {
        let suite = VerificationSuiteResult::from_results(
            vec![result("schema", true, 1.0), result("smoke", false, 1.0)],
            1.0,
        );
        assert!(suite.result_for("smoke").is_some_and(|r| !r.passed));
        assert!(suite.result_for("replay").is_none());
    }

    // ── VerificationResult ───────────────────────────────────────────────────

    #[test]
    fn confidence_is_clamped_to_unit_interval() {
        assert_eq!(result("x", true, 1.7).confidence, 1.0);
        assert_eq!(result("x", true, -0.2).confidence, 0.0);
        assert_eq!(result("x", true, f64::NAN).confidence, 0.0);
    }

    #[test]
    fn timed_out_result_shape() {
        let r = VerificationResult::timed_out("slow", 2000);
        assert!(!r.passed);
        assert_eq!(r.confidence, 0.0);
        assert_eq!(r.reason, "timed out");
        assert_eq!(r.evidence.get("timeout"), Some(&json!(true)));
    }

    #[test]
    fn internal_failure_result_shape() {
        let r = VerificationResult::internal_failure("schema", "bad schema document", 0.3);
        assert!(!r.passed);
        assert_eq!(r.confidence, 0.5);
        assert_eq!(r.evidence.get("error"), Some(&json!("bad schema document")));
    }

    // ── ErrorCategory ────────────────────────────────────────────────────────

    #[test]
    fn category_parses_pascal_and_snake_case() {
        assert_eq!(ErrorCategory::from_str("SchemaViolation").unwrap(), ErrorCategory::SchemaViolation);
        assert_eq!(ErrorCategory::from_str("schema_violation").unwrap(), ErrorCategory::SchemaViolation);
        assert_eq!(ErrorCategory::from_str(" timeout ").unwrap(), ErrorCategory::Timeout);
        for category in ErrorCategory::ALL {
            assert_eq!(ErrorCategory::from_str(category.as_str()).unwrap(), category);
        }
    }

    #[test]
    fn unknown_category_name_is_config_error() {
        match ErrorCategory::from_str("Cosmic") {
            Err(VerdictError::ConfigError { reason }) => assert!(reason.contains("Cosmic")),
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn category_serializes_as_canonical_name() {
        let json = serde_json::to_string(&ErrorCategory::PolicyDegraded).unwrap();
        assert_eq!(json, "\"PolicyDegraded\"");
    }

    // ── RetryAction / RetryDecision ──────────────────────────────────────────

    #[test]
    fn only_accept_and_escalate_are_terminal() {
        assert!(!RetryAction::Accept.is_retry());
        assert!(!RetryAction::Escalate.is_retry());
        assert!(RetryAction::RetryWithSchema.is_retry());
        assert!(RetryAction::RetrySelectorHeal.is_retry());

        assert!(RetryDecision::escalate(2, "ceiling").is_terminal());
        assert!(RetryDecision::accept(2, "ceiling").is_terminal());
    }

    #[test]
    fn retry_action_serializes_snake_case() {
        let json = serde_json::to_string(&RetryAction::RetryDifferentSpecialist).unwrap();
        assert_eq!(json, "\"retry_different_specialist\"");
    }

    // ── RetryLimitConfig ─────────────────────────────────────────────────────

    #[test]
    fn effective_max_is_capped_by_global() {
        let config = RetryLimitConfig::new(3)
            .with_override(ErrorCategory::MissingEvidence, 5)
            .with_override(ErrorCategory::Timeout, 1);

        assert_eq!(config.effective_max(ErrorCategory::MissingEvidence), 3);
        assert_eq!(config.effective_max(ErrorCategory::Timeout), 1);
        assert_eq!(config.effective_max(ErrorCategory::Unknown), 3);
    }

    #[test]
    fn default_limits_carry_per_category_ceilings() {
        let config = RetryLimitConfig::default();

        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.effective_max(ErrorCategory::PolicyDegraded), 0);
        assert_eq!(config.effective_max(ErrorCategory::Timeout), 1);
        assert_eq!(config.effective_max(ErrorCategory::SchemaViolation), 2);
        assert_eq!(config.effective_max(ErrorCategory::MissingEvidence), 3);
        for category in ErrorCategory::ALL {
            assert!(config.category_overrides.contains_key(&category), "{category} has no ceiling");
        }
    }

    // ── VerificationInput ────────────────────────────────────────────────────

    #[test]
    fn task_type_serializes_as_type() {
        let task = TaskSpec::new("triage_failure", Map::new());
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["type"], json!("triage_failure"));
    }

    #[test]
    fn previous_result_from_context_result_drops_explain() {
        let mut explain = Map::new();
        explain.insert("trace".to_string(), json!([1, 2]));
        let current = ContextResult {
            summary: vec!["login suite flaked twice".to_string()],
            affordances: vec![Affordance::new("rerun", "flake suspected")],
            explain: Some(explain),
        };
        let input = VerificationInput::new(current.clone(), TaskSpec::default(), InputMetadata::default())
            .with_previous_result(PreviousResult::from(&current));

        let previous = input.previous_result.unwrap();
        assert_eq!(previous.summary, current.summary);
        assert_eq!(previous.affordances, current.affordances);
    }

    // ── VerdictError display messages ────────────────────────────────────────

    #[test]
    fn error_retry_limit_exceeded_display() {
        let err = VerdictError::RetryLimitExceeded {
            category: ErrorCategory::Timeout,
            attempt: 1,
            max_attempts: 1,
        };
        let msg = err.to_string();
        assert!(msg.contains("retry limit exceeded"));
        assert!(msg.contains("Timeout"));
    }

    #[test]
    fn error_idempotency_violation_display() {
        let err = VerdictError::IdempotencyViolation {
            key: "ab12".to_string(),
            existing_message_id: "msg-7".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("idempotency violation"));
        assert!(msg.contains("msg-7"));
    }

    #[test]
    fn error_config_error_display() {
        let err = VerdictError::ConfigError {
            reason: "RETRY_MAX_ATTEMPTS is not a number".to_string(),
        };
        assert!(err.to_string().contains("configuration error"));
    }
}
