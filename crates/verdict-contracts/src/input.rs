//! Verification input types.
//!
//! A `VerificationInput` is the immutable snapshot every verifier receives.
//! It bundles the specialist's candidate output (`ContextResult`) with the
//! task that produced it and the routing metadata the orchestrator attached.
//! Verifiers only read it; the suite shares one copy across all of them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A suggested next action surfaced to the consumer of a context result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Affordance {
    /// Short imperative label, e.g. "rerun flaky suite".
    pub action: String,
    /// Why the specialist suggests it.
    pub why: String,
}

impl Affordance {
    pub fn new(action: impl Into<String>, why: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            why: why.into(),
        }
    }
}

/// The candidate output a specialist produced for a task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextResult {
    /// Ordered summary lines. Expected to be non-empty strings.
    pub summary: Vec<String>,
    /// Ordered suggested next actions.
    pub affordances: Vec<Affordance>,
    /// Optional opaque explanation payload. Never inspected by the core.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explain: Option<Map<String, Value>>,
}

/// The request that produced a `ContextResult`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskSpec {
    /// Discriminant for the kind of task, e.g. "triage_failure".
    #[serde(rename = "type")]
    pub task_type: String,
    /// Arbitrary task inputs. Key order is irrelevant to every consumer.
    #[serde(default)]
    pub inputs: Map<String, Value>,
}

impl TaskSpec {
    pub fn new(task_type: impl Into<String>, inputs: Map<String, Value>) -> Self {
        Self {
            task_type: task_type.into(),
            inputs,
        }
    }
}

/// Routing metadata attached by the orchestrator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputMetadata {
    /// Which specialist produced the candidate result.
    pub specialist_id: String,
    /// The bus message that carried the result.
    pub message_id: String,
    /// How many retries preceded this attempt. Zero on the first attempt.
    pub retry_depth: u32,
}

/// A prior result used as the consistency baseline by the replay verifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviousResult {
    pub summary: Vec<String>,
    pub affordances: Vec<Affordance>,
}

impl From<&ContextResult> for PreviousResult {
    fn from(result: &ContextResult) -> Self {
        Self {
            summary: result.summary.clone(),
            affordances: result.affordances.clone(),
        }
    }
}

/// Everything a verifier may look at for one candidate result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerificationInput {
    pub context_result: ContextResult,
    pub task: TaskSpec,
    pub metadata: InputMetadata,
    /// Overrides the schema verifier's built-in default when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_schema: Option<Value>,
    /// Baseline for the replay verifier. Absent on first runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_result: Option<PreviousResult>,
}

impl VerificationInput {
    /// Build an input with no schema override and no replay baseline.
    pub fn new(context_result: ContextResult, task: TaskSpec, metadata: InputMetadata) -> Self {
        Self {
            context_result,
            task,
            metadata,
            expected_schema: None,
            previous_result: None,
        }
    }

    pub fn with_expected_schema(mut self, schema: Value) -> Self {
        self.expected_schema = Some(schema);
        self
    }

    pub fn with_previous_result(mut self, previous: PreviousResult) -> Self {
        self.previous_result = Some(previous);
        self
    }
}
