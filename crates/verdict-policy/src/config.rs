//! Retry policy configuration schema.
//!
//! A `RetryPolicyConfig` is deserialized from TOML. Every field has a
//! default, so an empty document yields the stock policy:
//!
//! ```toml
//! global_max_retries = 3
//! enable_escalation = true
//! stability_specialist = "specialist-stability"
//! selector_heal_specialist = "specialist-selector-heal"
//! performance_specialist = "specialist-performance"
//! expand_budget_step_bytes = 10000
//! alternative_specialists = ["specialist-primary", "specialist-secondary"]
//!
//! [category_max]
//! schema_violation = 2
//! policy_degraded = 0
//! ```

use serde::{Deserialize, Serialize};

use verdict_contracts::retry::ErrorCategory;

/// Per-category retry ceilings, one field per `ErrorCategory`.
///
/// Kept as a struct rather than a map so that a new category cannot be added
/// without also giving it a ceiling here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryLimits {
    pub schema_violation: u32,
    pub missing_evidence: u32,
    pub flaky_pattern: u32,
    pub selector_issue: u32,
    /// Zero: never retried automatically.
    pub policy_degraded: u32,
    pub low_confidence: u32,
    pub timeout: u32,
    pub inconsistent: u32,
    pub unknown: u32,
}

impl CategoryLimits {
    pub fn get(&self, category: ErrorCategory) -> u32 {
        match category {
            ErrorCategory::SchemaViolation => self.schema_violation,
            ErrorCategory::MissingEvidence => self.missing_evidence,
            ErrorCategory::FlakyPattern => self.flaky_pattern,
            ErrorCategory::SelectorIssue => self.selector_issue,
            ErrorCategory::PolicyDegraded => self.policy_degraded,
            ErrorCategory::LowConfidence => self.low_confidence,
            ErrorCategory::Timeout => self.timeout,
            ErrorCategory::Inconsistent => self.inconsistent,
            ErrorCategory::Unknown => self.unknown,
        }
    }

    pub fn set(&mut self, category: ErrorCategory, max: u32) {
        let slot = match category {
            ErrorCategory::SchemaViolation => &mut self.schema_violation,
            ErrorCategory::MissingEvidence => &mut self.missing_evidence,
            ErrorCategory::FlakyPattern => &mut self.flaky_pattern,
            ErrorCategory::SelectorIssue => &mut self.selector_issue,
            ErrorCategory::PolicyDegraded => &mut self.policy_degraded,
            ErrorCategory::LowConfidence => &mut self.low_confidence,
            ErrorCategory::Timeout => &mut self.timeout,
            ErrorCategory::Inconsistent => &mut self.inconsistent,
            ErrorCategory::Unknown => &mut self.unknown,
        };
        *slot = max;
    }
}

impl Default for CategoryLimits {
    fn default() -> Self {
        Self {
            schema_violation: 2,
            missing_evidence: 3,
            flaky_pattern: 2,
            selector_issue: 2,
            policy_degraded: 0,
            low_confidence: 2,
            timeout: 1,
            inconsistent: 2,
            unknown: 1,
        }
    }
}

/// The top-level structure deserialized from a retry policy TOML file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicyConfig {
    /// Hard ceiling across all categories.
    pub global_max_retries: u32,

    /// When false, exhausting a category's ceiling accepts the result as-is
    /// instead of escalating. `PolicyDegraded` escalates regardless.
    pub enable_escalation: bool,

    pub category_max: CategoryLimits,

    /// Target for `FlakyPattern` retries.
    pub stability_specialist: String,

    /// Target for `SelectorIssue` retries.
    pub selector_heal_specialist: String,

    /// Target for `Timeout` retries.
    pub performance_specialist: String,

    /// Added to the caller's context budget on `MissingEvidence`.
    pub expand_budget_step_bytes: u64,

    /// Roster the default selector rotates through for `LowConfidence` and
    /// first-attempt `Unknown` retries.
    pub alternative_specialists: Vec<String>,
}

impl Default for RetryPolicyConfig {
    fn default() -> Self {
        Self {
            global_max_retries: 3,
            enable_escalation: true,
            category_max: CategoryLimits::default(),
            stability_specialist: "specialist-stability".to_string(),
            selector_heal_specialist: "specialist-selector-heal".to_string(),
            performance_specialist: "specialist-performance".to_string(),
            expand_budget_step_bytes: 10_000,
            alternative_specialists: vec![
                "specialist-primary".to_string(),
                "specialist-secondary".to_string(),
            ],
        }
    }
}
