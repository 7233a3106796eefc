//! Dedupe stores for idempotency keys.
//!
//! The exactly-once contract needs an atomic check-and-set keyed by the
//! digest: the first publisher of a key records its message id, and every
//! later attempt with the same key is refused with the id already on record.
//! Production deployments implement `DedupeStore` over their bus or database;
//! `InMemoryDedupeStore` is the reference implementation.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use tracing::{debug, warn};

use verdict_contracts::{
    error::{VerdictError, VerdictResult},
    idempotency::IdempotencyKey,
};

/// Shared record of already-published idempotency keys.
pub trait DedupeStore: Send + Sync {
    /// Record `key` as published under `message_id`, atomically.
    ///
    /// Returns `VerdictError::IdempotencyViolation` carrying the existing
    /// message id if the key was already recorded. A refused call leaves the
    /// store unchanged.
    fn check_and_set(&self, key: &IdempotencyKey, message_id: &str) -> VerdictResult<()>;

    /// The message id recorded for a digest, if any.
    fn get(&self, key: &str) -> VerdictResult<Option<String>>;
}

/// An in-memory dedupe store backed by a `HashMap` behind a `Mutex`.
///
/// Clones share the same map, so one store can outlive the gates that use
/// it, which is how tests model a restart against a persistent store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDedupeStore {
    pub(crate) seen: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryDedupeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys recorded so far.
    ///
    /// Fails with `DedupeStoreFailed` once the lock is poisoned rather than
    /// reporting an empty store.
    pub fn len(&self) -> VerdictResult<usize> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> VerdictResult<bool> {
        Ok(self.len()? == 0)
    }

    fn lock(&self) -> VerdictResult<MutexGuard<'_, HashMap<String, String>>> {
        self.seen.lock().map_err(|e| VerdictError::DedupeStoreFailed {
            reason: format!("dedupe store lock poisoned: {e}"),
        })
    }
}

impl DedupeStore for InMemoryDedupeStore {
    fn check_and_set(&self, key: &IdempotencyKey, message_id: &str) -> VerdictResult<()> {
        let mut seen = self.lock()?;

        if let Some(existing) = seen.get(&key.key) {
            warn!(
                key = %key.key,
                trace_id = %key.trace_id,
                existing_message_id = %existing,
                attempted_message_id = %message_id,
                "duplicate publish refused"
            );
            return Err(VerdictError::IdempotencyViolation {
                key: key.key.clone(),
                existing_message_id: existing.clone(),
            });
        }

        seen.insert(key.key.clone(), message_id.to_string());
        debug!(key = %key.key, %message_id, "idempotency key recorded");
        Ok(())
    }

    fn get(&self, key: &str) -> VerdictResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
