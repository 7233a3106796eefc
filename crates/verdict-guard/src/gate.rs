//! The publish gate: the last check before a retry directive or decision
//! notice leaves the process.
//!
//! Order of checks for a retry directive:
//!
//!   retry ceiling → key generation → dedupe check-and-set
//!
//! The ceiling is checked first so a refused retry never consumes a key.

use std::sync::Arc;

use tracing::info;

use verdict_contracts::{
    error::VerdictResult,
    idempotency::IdempotencyKey,
    retry::ErrorCategory,
};

use crate::{
    key::{generate_idempotency_key, KeyInput},
    limit::RetryLimitGuard,
    store::DedupeStore,
};

/// Combines the retry-limit guard with a shared dedupe store.
pub struct PublishGate {
    guard: RetryLimitGuard,
    store: Arc<dyn DedupeStore>,
}

impl PublishGate {
    pub fn new(guard: RetryLimitGuard, store: Arc<dyn DedupeStore>) -> Self {
        Self { guard, store }
    }

    pub fn guard(&self) -> &RetryLimitGuard {
        &self.guard
    }

    /// Authorize publishing a retry directive for a failure of `category`.
    ///
    /// # Errors
    ///
    /// - `RetryLimitExceeded` if `input.attempt_no` has reached the
    ///   category's ceiling. No key is recorded.
    /// - `IdempotencyViolation` if this exact directive was already
    ///   published; carries the existing message id.
    pub fn authorize_retry(
        &self,
        input: &KeyInput<'_>,
        category: ErrorCategory,
        message_id: &str,
    ) -> VerdictResult<IdempotencyKey> {
        self.guard.check_retry(input.attempt_no, category)?;
        let key = self.claim(input, message_id)?;
        info!(
            trace_id = %key.trace_id,
            attempt_no = key.attempt_no,
            category = %category,
            remaining = self.guard.remaining_attempts(input.attempt_no, category),
            %message_id,
            "retry directive authorized"
        );
        Ok(key)
    }

    /// Authorize publishing a decision notice (accept or escalate).
    ///
    /// Notices are not subject to the retry ceiling, only to dedupe.
    pub fn authorize_notice(&self, input: &KeyInput<'_>, message_id: &str) -> VerdictResult<IdempotencyKey> {
        let key = self.claim(input, message_id)?;
        info!(trace_id = %key.trace_id, attempt_no = key.attempt_no, %message_id, "decision notice authorized");
        Ok(key)
    }

    fn claim(&self, input: &KeyInput<'_>, message_id: &str) -> VerdictResult<IdempotencyKey> {
        let key = generate_idempotency_key(input);
        self.store.check_and_set(&key, message_id)?;
        Ok(key)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
