//! Idempotency key type.
//!
//! The key is a pure function of what was attempted: the same trace, task,
//! attempt number and reason set always hash to the same digest. Generation
//! lives in `verdict-guard`; this crate only defines the shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A dedupe key for one retry directive or decision notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdempotencyKey {
    /// Lowercase 64-character hex SHA-256 digest.
    pub key: String,
    pub trace_id: String,
    pub attempt_no: u32,
    /// When the key was computed. Not part of the digest.
    pub generated_at: DateTime<Utc>,
}

impl IdempotencyKey {
    pub const HEX_LEN: usize = 64;

    /// True when `key` has the shape of a hex SHA-256 digest.
    pub fn is_well_formed(&self) -> bool {
        self.key.len() == Self::HEX_LEN
            && self
                .key
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
    }
}
