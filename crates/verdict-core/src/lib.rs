//! # verdict-core
//!
//! The verifier contract and the suite that runs verifiers under a deadline.
//!
//! This crate provides:
//! - The `Verifier` trait every check implements
//! - The `VerificationSuite` that runs the active verifiers concurrently,
//!   substitutes failing results for the ones that miss the deadline, and
//!   folds everything into one `VerificationSuiteResult`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use verdict_core::{SuiteConfig, VerificationSuite};
//!
//! let suite = VerificationSuite::new(SuiteConfig::default())
//!     .with_verifier(Arc::new(SchemaVerifier::new()))
//!     .with_verifier(Arc::new(SmokeVerifier::default()));
//! let verdict = suite.run(input).await;
//! ```

pub mod suite;
pub mod traits;

pub use suite::{SuiteConfig, VerificationSuite};
pub use traits::Verifier;
