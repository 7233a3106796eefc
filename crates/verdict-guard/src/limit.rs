//! Retry-limit guard used at the publish boundary.
//!
//! This is a second gate, independent of the retry policy's own ceiling
//! check: before a retry directive goes out, the publisher re-checks the
//! attempt against `RetryLimitConfig`. The guard is read-only and side-effect
//! free.
//!
//! Configuration comes from the environment, loaded once at process start:
//!
//! - `RETRY_MAX_ATTEMPTS`: global ceiling (default 3)
//! - `RETRY_CATEGORY_OVERRIDES`: e.g. `Timeout=1,schema_violation=2`
//!
//! Overrides replace individual entries of the default per-category
//! ceilings; categories not named keep their default.

use std::str::FromStr;

use tracing::warn;

use verdict_contracts::{
    error::{VerdictError, VerdictResult},
    retry::{ErrorCategory, RetryLimitConfig},
};

pub const MAX_ATTEMPTS_VAR: &str = "RETRY_MAX_ATTEMPTS";
pub const CATEGORY_OVERRIDES_VAR: &str = "RETRY_CATEGORY_OVERRIDES";

/// Read-only ceiling checks over a `RetryLimitConfig`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryLimitGuard {
    config: RetryLimitConfig,
}

impl RetryLimitGuard {
    pub fn new(config: RetryLimitConfig) -> Self {
        Self { config }
    }

    /// Load the config from the process environment.
    pub fn from_env() -> VerdictResult<Self> {
        Self::from_vars(std::env::vars())
    }

    /// Load the config from any key/value source. Unrelated keys are ignored.
    ///
    /// Returns `VerdictError::ConfigError` for a non-numeric value, a
    /// malformed override pair, or an unknown category name.
    pub fn from_vars<I, K, V>(vars: I) -> VerdictResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = RetryLimitConfig::default();

        for (key, value) in vars {
            let value = value.as_ref().trim();
            match key.as_ref() {
                MAX_ATTEMPTS_VAR => {
                    config.max_attempts = value.parse::<u32>().map_err(|e| VerdictError::ConfigError {
                        reason: format!("{MAX_ATTEMPTS_VAR}='{value}' is not a valid attempt count: {e}"),
                    })?;
                }
                CATEGORY_OVERRIDES_VAR => {
                    for (category, max) in parse_overrides(value)? {
                        config.category_overrides.insert(category, max);
                    }
                }
                _ => {}
            }
        }

        Ok(Self::new(config))
    }

    pub fn config(&self) -> &RetryLimitConfig {
        &self.config
    }

    /// `min(category override, global max)`.
    pub fn max_attempts(&self, category: ErrorCategory) -> u32 {
        self.config.effective_max(category)
    }

    /// False once `attempt` has reached the category's effective ceiling.
    pub fn is_retry_allowed(&self, attempt: u32, category: ErrorCategory) -> bool {
        attempt < self.max_attempts(category)
    }

    pub fn remaining_attempts(&self, attempt: u32, category: ErrorCategory) -> u32 {
        self.max_attempts(category).saturating_sub(attempt)
    }

    /// The error-raising form of [`is_retry_allowed`](Self::is_retry_allowed).
    pub fn check_retry(&self, attempt: u32, category: ErrorCategory) -> VerdictResult<()> {
        if self.is_retry_allowed(attempt, category) {
            return Ok(());
        }
        let max_attempts = self.max_attempts(category);
        warn!(category = %category, attempt, max_attempts, "retry refused at publish boundary");
        Err(VerdictError::RetryLimitExceeded {
            category,
            attempt,
            max_attempts,
        })
    }
}

fn parse_overrides(raw: &str) -> VerdictResult<Vec<(ErrorCategory, u32)>> {
    raw.split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (name, max) = pair.split_once('=').ok_or_else(|| VerdictError::ConfigError {
                reason: format!("{CATEGORY_OVERRIDES_VAR} entry '{pair}' is not Category=N"),
            })?;
            let category = ErrorCategory::from_str(name)?;
            let max = max.trim().parse::<u32>().map_err(|e| VerdictError::ConfigError {
                reason: format!("{CATEGORY_OVERRIDES_VAR} entry '{pair}' has an invalid count: {e}"),
            })?;
            Ok((category, max))
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use verdict_contracts::{
        error::VerdictError,
        retry::{ErrorCategory, RetryLimitConfig},
    };

    use super::{RetryLimitGuard, CATEGORY_OVERRIDES_VAR, MAX_ATTEMPTS_VAR};

    fn guard(vars: &[(&str, &str)]) -> RetryLimitGuard {
        RetryLimitGuard::from_vars(vars.iter().copied()).unwrap()
    }

    #[test]
    fn defaults_without_env() {
        let g = guard(&[("PATH", "/usr/bin")]);
        assert_eq!(g.config(), &RetryLimitConfig::default());
        assert_eq!(g.max_attempts(ErrorCategory::Timeout), 1);
        assert_eq!(g.max_attempts(ErrorCategory::MissingEvidence), 3);
    }

    /// Without any configuration the guard is as strict as the default
    /// retry policy.
    #[test]
    fn default_guard_never_retries_policy_degraded() {
        let g = RetryLimitGuard::default();
        assert!(!g.is_retry_allowed(0, ErrorCategory::PolicyDegraded));
        assert!(matches!(
            g.check_retry(0, ErrorCategory::PolicyDegraded),
            Err(VerdictError::RetryLimitExceeded { max_attempts: 0, .. })
        ));

        assert!(g.is_retry_allowed(0, ErrorCategory::Timeout));
        assert!(!g.is_retry_allowed(1, ErrorCategory::Timeout));

        let from_empty_env = RetryLimitGuard::from_vars(std::iter::empty::<(&str, &str)>()).unwrap();
        assert!(!from_empty_env.is_retry_allowed(0, ErrorCategory::PolicyDegraded));
    }

    #[test]
    fn env_sets_global_and_overrides() {
        let g = guard(&[
            (MAX_ATTEMPTS_VAR, "4"),
            (CATEGORY_OVERRIDES_VAR, "Timeout=1, schema_violation=2,,MissingEvidence=9"),
        ]);

        assert_eq!(g.max_attempts(ErrorCategory::Timeout), 1);
        assert_eq!(g.max_attempts(ErrorCategory::SchemaViolation), 2);
        // Override above the global ceiling is capped.
        assert_eq!(g.max_attempts(ErrorCategory::MissingEvidence), 4);
        // Untouched categories keep their default ceiling.
        assert_eq!(g.max_attempts(ErrorCategory::Unknown), 1);
        assert_eq!(g.max_attempts(ErrorCategory::FlakyPattern), 2);
    }

    #[test]
    fn retry_allowed_below_ceiling_only() {
        let g = RetryLimitGuard::new(RetryLimitConfig::new(3).with_override(ErrorCategory::SchemaViolation, 2));

        assert!(g.is_retry_allowed(0, ErrorCategory::SchemaViolation));
        assert!(g.is_retry_allowed(1, ErrorCategory::SchemaViolation));
        assert!(!g.is_retry_allowed(2, ErrorCategory::SchemaViolation));
        assert_eq!(g.remaining_attempts(1, ErrorCategory::SchemaViolation), 1);
        assert_eq!(g.remaining_attempts(5, ErrorCategory::SchemaViolation), 0);
    }

    #[test]
    fn zero_override_never_allows_retry() {
        let g = RetryLimitGuard::new(RetryLimitConfig::new(3).with_override(ErrorCategory::PolicyDegraded, 0));
        assert!(!g.is_retry_allowed(0, ErrorCategory::PolicyDegraded));
    }

    #[test]
    fn check_retry_raises_limit_exceeded() {
        let g = RetryLimitGuard::new(RetryLimitConfig::new(3).with_override(ErrorCategory::Timeout, 1));

        assert!(g.check_retry(0, ErrorCategory::Timeout).is_ok());
        match g.check_retry(1, ErrorCategory::Timeout) {
            Err(VerdictError::RetryLimitExceeded { category, attempt, max_attempts }) => {
                assert_eq!(category, ErrorCategory::Timeout);
                assert_eq!(attempt, 1);
                assert_eq!(max_attempts, 1);
            }
            other => panic!("expected RetryLimitExceeded, got {other:?}"),
        }
    }

    #[test]
    fn non_numeric_max_attempts_is_config_error() {
        let result = RetryLimitGuard::from_vars([(MAX_ATTEMPTS_VAR, "lots")]);
        match result {
            Err(VerdictError::ConfigError { reason }) => assert!(reason.contains(MAX_ATTEMPTS_VAR)),
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }

    #[test]
    fn malformed_overrides_are_config_errors() {
        for raw in ["Timeout", "Timeout=soon", "Cosmic=1"] {
            let result = RetryLimitGuard::from_vars([(CATEGORY_OVERRIDES_VAR, raw)]);
            assert!(
                matches!(result, Err(VerdictError::ConfigError { .. })),
                "'{raw}' should be rejected, got {result:?}"
            );
        }
    }
}
