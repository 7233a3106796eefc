//! The verifier contract.
//!
//! A verifier judges one aspect of a specialist's candidate output. The suite
//! runs many of them side by side over the same read-only input, so
//! implementations must be `Send + Sync` and hold no exclusive resources
//! across an await point that a discarded run would leak.

use async_trait::async_trait;

use verdict_contracts::{input::VerificationInput, verify::VerificationResult};

/// An independent, pluggable check over a `VerificationInput`.
///
/// Implementations never fail past their own boundary: internal errors are
/// reported as `passed = false, confidence = 0.5` with the error captured in
/// `evidence` (see `VerificationResult::internal_failure`).
///
/// No implementation may assume it will be interrupted. The suite stops
/// waiting on a verifier that misses its deadline but lets it run to
/// completion in the background and discards the result.
///
/// Each call is driven on a dedicated blocking-pool thread, so synchronous
/// work inside `verify` cannot stall other verifiers or the deadline. It
/// still occupies a pool thread until it returns, so long blocking work
/// should honor `timeout_ms` itself.
#[async_trait]
pub trait Verifier: Send + Sync {
    /// Stable name used for allow-listing, logging, and result lookup.
    fn name(&self) -> &str;

    /// Judge `input`. `timeout_ms` is the deadline the suite will enforce;
    /// verifiers with internal budgets may use it to size their work.
    async fn verify(&self, input: &VerificationInput, timeout_ms: u64) -> VerificationResult;
}
