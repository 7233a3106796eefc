//! # verdict-verify
//!
//! Concrete verifiers for the VERDICT verification suite. Each implements
//! [`verdict_core::traits::Verifier`] and depends only on the shared
//! contracts:
//!
//! - [`schema::SchemaVerifier`]: structural validation via JSON Schema,
//!   against the caller's `expected_schema` or a built-in default.
//! - [`smoke::SmokeVerifier`]: deterministic bound checks on counts,
//!   lengths, blank fields, and leaked internal-failure wording.
//! - [`replay::ReplayVerifier`]: weighted Jaccard consistency against the
//!   previous result, neutral when there is no baseline.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use verdict_core::{SuiteConfig, VerificationSuite};
//! use verdict_verify::{ReplayVerifier, SchemaVerifier, SmokeVerifier};
//!
//! let suite = VerificationSuite::new(SuiteConfig::default())
//!     .with_verifier(Arc::new(SchemaVerifier::new()))
//!     .with_verifier(Arc::new(SmokeVerifier::default()))
//!     .with_verifier(Arc::new(ReplayVerifier::default()));
//! ```

pub mod replay;
pub mod schema;
pub mod smoke;

pub use replay::{ReplayConfig, ReplayVerifier};
pub use schema::SchemaVerifier;
pub use smoke::{SmokeConfig, SmokeVerifier};
