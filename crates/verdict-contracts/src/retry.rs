//! Failure taxonomy and retry decision types.
//!
//! `ErrorCategory` and `RetryAction` are closed sets. Adding a variant to
//! either forces every `match` in the retry policy to handle it, which is the
//! point: there is no silent fallthrough for an unmapped failure cause.

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::VerdictError;

/// Why a candidate result was rejected. Derived upstream from suite evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ErrorCategory {
    SchemaViolation,
    MissingEvidence,
    FlakyPattern,
    SelectorIssue,
    PolicyDegraded,
    LowConfidence,
    Timeout,
    Inconsistent,
    Unknown,
}

impl ErrorCategory {
    /// Every category, in declaration order.
    pub const ALL: [ErrorCategory; 9] = [
        ErrorCategory::SchemaViolation,
        ErrorCategory::MissingEvidence,
        ErrorCategory::FlakyPattern,
        ErrorCategory::SelectorIssue,
        ErrorCategory::PolicyDegraded,
        ErrorCategory::LowConfidence,
        ErrorCategory::Timeout,
        ErrorCategory::Inconsistent,
        ErrorCategory::Unknown,
    ];

    /// The canonical `PascalCase` name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::SchemaViolation => "SchemaViolation",
            ErrorCategory::MissingEvidence => "MissingEvidence",
            ErrorCategory::FlakyPattern => "FlakyPattern",
            ErrorCategory::SelectorIssue => "SelectorIssue",
            ErrorCategory::PolicyDegraded => "PolicyDegraded",
            ErrorCategory::LowConfidence => "LowConfidence",
            ErrorCategory::Timeout => "Timeout",
            ErrorCategory::Inconsistent => "Inconsistent",
            ErrorCategory::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorCategory {
    type Err = VerdictError;

    /// Accepts the canonical `PascalCase` name or its `snake_case` form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s.trim().chars().filter(|c| *c != '_').collect();
        ErrorCategory::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| VerdictError::ConfigError {
                reason: format!("unknown error category '{s}'"),
            })
    }
}

/// What the orchestrator should do with a rejected result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryAction {
    Accept,
    RetryExpandContext,
    RetryDifferentSpecialist,
    RetryWithSchema,
    RetryStability,
    RetrySelectorHeal,
    Escalate,
}

impl RetryAction {
    /// True for every action that dispatches another specialist invocation.
    pub fn is_retry(&self) -> bool {
        !matches!(self, RetryAction::Accept | RetryAction::Escalate)
    }
}

/// Adjustments to apply to the next specialist invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextDelta {
    /// New context budget, in bytes. Zero leaves the budget unchanged.
    pub expand_budget_bytes: u64,
    /// Extra instructions appended to the specialist prompt.
    pub add_hints: Vec<String>,
    /// Whether to ship the expected schema with the retry.
    pub include_schema: bool,
}

/// The policy's verdict for one failed attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryDecision {
    pub action: RetryAction,
    /// Which specialist the retry goes to. `None` for accept and escalate.
    pub target_specialist: Option<String>,
    pub context_delta: Option<ContextDelta>,
    /// Effective retry ceiling for the category this decision was made for.
    pub max_retries: u32,
    pub reason: String,
    /// Within `[0.0, 1.0]`.
    pub confidence: f64,
}

impl RetryDecision {
    pub fn accept(max_retries: u32, reason: impl Into<String>) -> Self {
        Self {
            action: RetryAction::Accept,
            target_specialist: None,
            context_delta: None,
            max_retries,
            reason: reason.into(),
            confidence: 1.0,
        }
    }

    pub fn escalate(max_retries: u32, reason: impl Into<String>) -> Self {
        Self {
            action: RetryAction::Escalate,
            target_specialist: None,
            context_delta: None,
            max_retries,
            reason: reason.into(),
            confidence: 1.0,
        }
    }

    pub fn is_retry(&self) -> bool {
        self.action.is_retry()
    }

    /// True when no further automated attempt follows this decision.
    pub fn is_terminal(&self) -> bool {
        !self.is_retry()
    }
}

/// What the caller knows about the failed attempt it wants a decision for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionContext {
    pub category: ErrorCategory,
    /// Retries already spent on this task. Zero on the first failure.
    pub current_retry_depth: u32,
    pub current_specialist: String,
    /// How sure the upstream categorizer is about `category`.
    pub category_confidence: f64,
    /// Context budget used by the failed attempt, if the caller tracks one.
    #[serde(default)]
    pub current_budget_bytes: Option<u64>,
}

impl DecisionContext {
    pub fn new(
        category: ErrorCategory,
        current_retry_depth: u32,
        current_specialist: impl Into<String>,
        category_confidence: f64,
    ) -> Self {
        Self {
            category,
            current_retry_depth,
            current_specialist: current_specialist.into(),
            category_confidence,
            current_budget_bytes: None,
        }
    }

    pub fn with_budget(mut self, bytes: u64) -> Self {
        self.current_budget_bytes = Some(bytes);
        self
    }
}

/// Retry ceilings enforced at the publish boundary.
///
/// Loaded once at process start and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryLimitConfig {
    /// Global ceiling on attempts for any category.
    pub max_attempts: u32,
    /// Per-category ceilings. Each is still capped by `max_attempts`.
    #[serde(default)]
    pub category_overrides: BTreeMap<ErrorCategory, u32>,
}

impl RetryLimitConfig {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            category_overrides: BTreeMap::new(),
        }
    }

    pub fn with_override(mut self, category: ErrorCategory, max: u32) -> Self {
        self.category_overrides.insert(category, max);
        self
    }

    /// `min(override, max_attempts)`, or `max_attempts` with no override.
    pub fn effective_max(&self, category: ErrorCategory) -> u32 {
        self.category_overrides
            .get(&category)
            .map_or(self.max_attempts, |o| (*o).min(self.max_attempts))
    }
}

/// The standard per-category ceilings, matching the retry policy's defaults.
const DEFAULT_CATEGORY_CEILINGS: [(ErrorCategory, u32); 9] = [
    (ErrorCategory::SchemaViolation, 2),
    (ErrorCategory::MissingEvidence, 3),
    (ErrorCategory::FlakyPattern, 2),
    (ErrorCategory::SelectorIssue, 2),
    (ErrorCategory::PolicyDegraded, 0),
    (ErrorCategory::LowConfidence, 2),
    (ErrorCategory::Timeout, 1),
    (ErrorCategory::Inconsistent, 2),
    (ErrorCategory::Unknown, 1),
];

/// Global ceiling of 3 plus the standard per-category ceilings, so the
/// publish boundary is never looser than the default retry policy.
/// `RetryLimitConfig::new` starts with no per-category ceilings instead.
impl Default for RetryLimitConfig {
    fn default() -> Self {
        DEFAULT_CATEGORY_CEILINGS
            .into_iter()
            .fold(Self::new(Self::DEFAULT_MAX_ATTEMPTS), |config, (category, max)| {
                config.with_override(category, max)
            })
    }
}
