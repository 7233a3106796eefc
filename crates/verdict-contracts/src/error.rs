//! Error types for the VERDICT decision core.
//!
//! Verifiers never return errors; they report failure as data. The variants
//! here are for genuinely exceptional conditions: a caller acting past a
//! retry ceiling, a duplicate publish, or bad configuration.

use thiserror::Error;

use crate::retry::ErrorCategory;

/// The unified error type for the VERDICT crates.
#[derive(Debug, Error)]
pub enum VerdictError {
    /// An attempt was made after the category's retry ceiling was reached.
    ///
    /// This is a caller bug: the retry policy had already escalated.
    #[error("retry limit exceeded for {category}: attempt {attempt} is not below ceiling {max_attempts}")]
    RetryLimitExceeded {
        category: ErrorCategory,
        attempt: u32,
        max_attempts: u32,
    },

    /// A retry directive or decision notice with this key was already published.
    #[error("idempotency violation: key {key} already published as message '{existing_message_id}'")]
    IdempotencyViolation {
        key: String,
        existing_message_id: String,
    },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// A schema document could not be compiled or applied outside a verifier.
    #[error("schema validation error: {reason}")]
    SchemaValidation { reason: String },

    /// The dedupe store could not complete a check-and-set.
    #[error("dedupe store failed: {reason}")]
    DedupeStoreFailed { reason: String },
}

/// Convenience alias used throughout the VERDICT crates.
pub type VerdictResult<T> = Result<T, VerdictError>;
