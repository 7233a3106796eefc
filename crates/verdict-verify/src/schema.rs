//! Structural verifier for specialist context results.
//!
//! `SchemaVerifier` serializes the candidate `ContextResult` to JSON and
//! validates it with the `jsonschema` crate, against the input's
//! `expected_schema` when one is supplied and the built-in default otherwise.
//! Every violation is collected before returning so the caller sees the full
//! failure set in one pass.
//!
//! A clean pass and a clean fail are both certain verdicts (confidence 1.0).
//! Only a validator that cannot run at all, e.g. a malformed schema
//! document, drops confidence to 0.5.

use std::time::Instant;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use verdict_contracts::{
    error::{VerdictError, VerdictResult},
    input::VerificationInput,
    verify::VerificationResult,
};
use verdict_core::traits::Verifier;

/// The JSON Schema verifier.
pub struct SchemaVerifier {
    default_schema: Value,
}

impl SchemaVerifier {
    pub const NAME: &'static str = "schema";

    /// Create a verifier that falls back to [`SchemaVerifier::default_schema`].
    pub fn new() -> Self {
        Self {
            default_schema: Self::default_schema(),
        }
    }

    /// Create a verifier with a different fallback schema.
    ///
    /// The schema is not checked here; a malformed one surfaces as an
    /// internal failure on every run. Use
    /// [`try_with_default_schema`](Self::try_with_default_schema) to reject it
    /// up front.
    pub fn with_default_schema(schema: Value) -> Self {
        Self {
            default_schema: schema,
        }
    }

    /// Like [`with_default_schema`](Self::with_default_schema), but compiles
    /// the schema first.
    pub fn try_with_default_schema(schema: Value) -> VerdictResult<Self> {
        Self::check_schema(&schema)?;
        Ok(Self::with_default_schema(schema))
    }

    /// Compile `schema` without validating anything against it.
    ///
    /// Callers that attach an `expected_schema` to their inputs can run this
    /// once at configuration time. Returns `VerdictError::SchemaValidation`
    /// if the document is not a usable JSON Schema.
    pub fn check_schema(schema: &Value) -> VerdictResult<()> {
        jsonschema::validator_for(schema)
            .map(|_| ())
            .map_err(|e| VerdictError::SchemaValidation {
                reason: format!("invalid JSON Schema document: {e}"),
            })
    }

    /// The built-in contract for a context result.
    ///
    /// `summary` is a non-empty array of non-empty strings; `affordances` is a
    /// non-empty array of objects with non-empty `action` and `why`.
    pub fn default_schema() -> Value {
        json!({
            "type": "object",
            "required": ["summary", "affordances"],
            "properties": {
                "summary": {
                    "type": "array",
                    "minItems": 1,
                    "items": { "type": "string", "minLength": 1 }
                },
                "affordances": {
                    "type": "array",
                    "minItems": 1,
                    "items": {
                        "type": "object",
                        "required": ["action", "why"],
                        "properties": {
                            "action": { "type": "string", "minLength": 1 },
                            "why": { "type": "string", "minLength": 1 }
                        }
                    }
                },
                "explain": { "type": "object" }
            }
        })
    }

    /// Validate `instance` against `schema`.
    ///
    /// `Ok` carries the violation list (empty on pass). `Err` means the
    /// validator itself could not run.
    fn violations(schema: &Value, instance: &Value) -> Result<Vec<Value>, String> {
        let validator = jsonschema::validator_for(schema)
            .map_err(|e| format!("invalid JSON Schema document: {e}"))?;

        Ok(validator
            .iter_errors(instance)
            .map(|error| {
                let path = error.instance_path.to_string();
                json!({
                    "path": if path.is_empty() { "/".to_string() } else { path },
                    "message": error.to_string(),
                })
            })
            .collect())
    }
}

impl Default for SchemaVerifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Verifier for SchemaVerifier {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn verify(&self, input: &VerificationInput, _timeout_ms: u64) -> VerificationResult {
        let started = Instant::now();
        let (schema, schema_source) = match &input.expected_schema {
            Some(schema) => (schema, "expected"),
            None => (&self.default_schema, "default"),
        };

        let instance = match serde_json::to_value(&input.context_result) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "context result could not be serialized for validation");
                return VerificationResult::internal_failure(
                    Self::NAME,
                    format!("context result is not serializable: {e}"),
                    elapsed_ms(started),
                );
            }
        };

        let errors = match Self::violations(schema, &instance) {
            Ok(errors) => errors,
            Err(message) => {
                warn!(schema = schema_source, %message, "schema compilation failure");
                let mut result =
                    VerificationResult::internal_failure(Self::NAME, message, elapsed_ms(started));
                result
                    .evidence
                    .insert("schema".to_string(), Value::String(schema_source.to_string()));
                return result;
            }
        };

        let passed = errors.is_empty();
        let reason = if passed {
            format!("context result matches the {schema_source} schema")
        } else {
            let details = errors
                .iter()
                .map(|e| format!("{}: {}", e["path"].as_str().unwrap_or("/"), e["message"].as_str().unwrap_or("")))
                .collect::<Vec<_>>()
                .join("; ");
            warn!(
                schema = schema_source,
                violation_count = errors.len(),
                message_id = %input.metadata.message_id,
                "structural validation failure"
            );
            format!("schema validation failed: {details}")
        };

        let mut evidence = Map::new();
        evidence.insert("schema".to_string(), Value::String(schema_source.to_string()));
        evidence.insert("errors".to_string(), Value::Array(errors));

        debug!(passed, schema = schema_source, "schema verification complete");
        VerificationResult::new(Self::NAME, passed, 1.0, reason, evidence, elapsed_ms(started))
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}

// ── Tests ─────────────────────────────────────────────────────────────────────
