//! Idempotency key generation.
//!
//! The key commits to exactly what was attempted:
//!
//!   { attempt_no, reason_codes (sorted, deduplicated), task_inputs,
//!     task_type, trace_id }
//!
//! rendered as canonical JSON (object keys sorted at every depth, no
//! whitespace) and hashed with SHA-256. Canonicalization is explicit and does
//! not depend on how `serde_json::Map` happens to order keys in a given
//! build, so two processes that see the same inputs always agree on the key.

use chrono::Utc;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use tracing::debug;

use verdict_contracts::{idempotency::IdempotencyKey, input::TaskSpec};

/// Everything that identifies one retry directive or decision notice.
#[derive(Debug, Clone, Copy)]
pub struct KeyInput<'a> {
    pub trace_id: &'a str,
    pub task: &'a TaskSpec,
    /// Retries already spent on this task when the decision was made.
    pub attempt_no: u32,
    /// Order and duplicates are irrelevant; only the set counts.
    pub reason_codes: &'a [String],
}

/// Render `value` as canonical JSON: object keys sorted lexicographically at
/// every nesting level, array order preserved, no insignificant whitespace.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(item, out);
            }
            out.push('}');
        }
        // Scalars: serde_json's compact Display is already canonical.
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// Compute the deterministic dedupe key for `input`.
///
/// Returns a lowercase 64-character hex SHA-256 digest wrapped in an
/// `IdempotencyKey`. `generated_at` is informational and not hashed.
pub fn generate_idempotency_key(input: &KeyInput<'_>) -> IdempotencyKey {
    let mut reason_codes: Vec<&str> = input.reason_codes.iter().map(String::as_str).collect();
    reason_codes.sort_unstable();
    reason_codes.dedup();

    let document = json!({
        "trace_id": input.trace_id,
        "task_type": input.task.task_type,
        "task_inputs": Value::Object(input.task.inputs.clone()),
        "attempt_no": input.attempt_no,
        "reason_codes": reason_codes,
    });
    let canonical = canonical_json(&document);

    let key = hex::encode(Sha256::digest(canonical.as_bytes()));
    debug!(trace_id = %input.trace_id, attempt_no = input.attempt_no, %key, "idempotency key generated");

    IdempotencyKey {
        key,
        trace_id: input.trace_id.to_string(),
        attempt_no: input.attempt_no,
        generated_at: Utc::now(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::{json, Map, Value};

    use verdict_contracts::input::TaskSpec;

    use super::{canonical_json, generate_idempotency_key, KeyInput};

    fn task(inputs: Value) -> TaskSpec {
        let inputs = match inputs {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        TaskSpec::new("triage_failure", inputs)
    }

    fn codes(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn key(trace: &str, task: &TaskSpec, attempt: u32, reasons: &[String]) -> String {
        generate_idempotency_key(&KeyInput {
            trace_id: trace,
            task,
            attempt_no: attempt,
            reason_codes: reasons,
        })
        .key
    }

    // ── canonical_json ────────────────────────────────────────────────────────

    #[test]
    fn canonical_json_sorts_keys_at_every_depth() {
        let value = json!({
            "b": "s",
            "a": { "y": [ { "q": null, "p": true } ], "x": 1 }
        });
        assert_eq!(
            canonical_json(&value),
            r#"{"a":{"x":1,"y":[{"p":true,"q":null}]},"b":"s"}"#
        );
    }

    #[test]
    fn canonical_json_ignores_source_key_order() {
        let first: Value =
            serde_json::from_str(r#"{"suite":"checkout","env":{"region":"eu","browser":"firefox"}}"#).unwrap();
        let second: Value =
            serde_json::from_str(r#"{"env":{"browser":"firefox","region":"eu"},"suite":"checkout"}"#).unwrap();
        assert_eq!(canonical_json(&first), canonical_json(&second));
    }

    #[test]
    fn canonical_json_preserves_array_order_and_escapes_strings() {
        assert_eq!(canonical_json(&json!([3, 1, 2])), "[3,1,2]");
        assert_eq!(canonical_json(&json!({ "q\"k": "line\nbreak" })), r#"{"q\"k":"line\nbreak"}"#);
    }

    // ── generate_idempotency_key ──────────────────────────────────────────────

    #[test]
    fn key_is_64_lowercase_hex() {
        let t = task(json!({ "suite": "checkout" }));
        let k = generate_idempotency_key(&KeyInput {
            trace_id: "trace-1",
            task: &t,
            attempt_no: 0,
            reason_codes: &codes(&["schema"]),
        });
        assert_eq!(k.key.len(), 64);
        assert!(k.is_well_formed());
        assert_eq!(k.trace_id, "trace-1");
        assert_eq!(k.attempt_no, 0);
    }

    #[test]
    fn key_is_deterministic() {
        let t = task(json!({ "suite": "checkout", "env": { "browser": "firefox" } }));
        let reasons = codes(&["schema", "smoke"]);
        assert_eq!(key("trace-1", &t, 1, &reasons), key("trace-1", &t, 1, &reasons));
    }

    #[test]
    fn key_ignores_reason_code_order_and_duplicates() {
        let t = task(json!({ "suite": "checkout" }));
        assert_eq!(
            key("trace-1", &t, 1, &codes(&["smoke", "schema"])),
            key("trace-1", &t, 1, &codes(&["schema", "smoke", "schema"]))
        );
    }

    #[test]
    fn key_ignores_nested_input_key_order() {
        let a: Value = serde_json::from_str(r#"{"env":{"region":"eu","browser":"firefox"},"suite":"checkout"}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"suite":"checkout","env":{"browser":"firefox","region":"eu"}}"#).unwrap();
        let reasons = codes(&["schema"]);
        assert_eq!(key("t", &task(a), 0, &reasons), key("t", &task(b), 0, &reasons));
    }

    #[test]
    fn key_changes_when_any_component_changes() {
        let base_task = task(json!({ "suite": "checkout" }));
        let reasons = codes(&["schema"]);
        let base = key("trace-1", &base_task, 1, &reasons);

        assert_ne!(base, key("trace-2", &base_task, 1, &reasons));
        assert_ne!(base, key("trace-1", &base_task, 2, &reasons));
        assert_ne!(base, key("trace-1", &base_task, 1, &codes(&["schema", "smoke"])));
        assert_ne!(base, key("trace-1", &task(json!({ "suite": "login" })), 1, &reasons));

        let mut other_type = base_task.clone();
        other_type.task_type = "heal_selector".to_string();
        assert_ne!(base, key("trace-1", &other_type, 1, &reasons));
    }

    proptest! {
        #[test]
        fn key_is_order_invariant_for_any_reason_set(
            mut reasons in proptest::collection::vec("[a-z_]{1,12}", 0..6),
            trace in "[a-z0-9-]{1,16}",
            attempt in 0u32..10,
        ) {
            let t = task(json!({ "suite": "checkout" }));
            let forward = key(&trace, &t, attempt, &reasons);
            reasons.reverse();
            let reversed = key(&trace, &t, attempt, &reasons);
            prop_assert_eq!(forward, reversed);
        }
    }
}
