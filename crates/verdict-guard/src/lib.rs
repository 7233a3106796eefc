//! # verdict-guard
//!
//! The publish boundary of the VERDICT core.
//!
//! - [`key`] derives deterministic idempotency keys from what was attempted
//! - [`limit`] re-checks retry ceilings from environment configuration
//! - [`store`] records published keys so duplicates are refused
//! - [`gate`] combines the three into one authorization call
//!
//! Nothing here publishes anything. Callers ask the gate first and publish
//! only when it returns a key.

pub mod gate;
pub mod key;
pub mod limit;
pub mod store;

pub use gate::PublishGate;
pub use key::{canonical_json, generate_idempotency_key, KeyInput};
pub use limit::RetryLimitGuard;
pub use store::{DedupeStore, InMemoryDedupeStore};
