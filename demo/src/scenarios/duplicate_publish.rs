//! Scenario 4: Duplicate Publish
//!
//! Exercises the publish boundary on its own:
//!
//!   1. A retry directive is authorized and its key recorded
//!   2. The same directive is redelivered → refused as a duplicate
//!   3. The same directive with reason codes reordered → same key, refused
//!   4. The process "restarts": a new gate over the same store still refuses
//!   5. Ceilings come from RETRY_* variables; a retry past one is refused

use std::sync::Arc;

use verdict_contracts::{
    error::{VerdictError, VerdictResult},
    idempotency::IdempotencyKey,
    retry::ErrorCategory,
};
use verdict_guard::{
    limit::{CATEGORY_OVERRIDES_VAR, MAX_ATTEMPTS_VAR},
    generate_idempotency_key, DedupeStore, InMemoryDedupeStore, KeyInput, PublishGate, RetryLimitGuard,
};

use super::new_message_id;
use crate::mock_specialists::triage_task;

fn report(label: &str, outcome: VerdictResult<IdempotencyKey>) {
    match outcome {
        Ok(key) => println!("  {label:<28} AUTHORIZED  key {}…", &key.key[..16]),
        Err(VerdictError::IdempotencyViolation { existing_message_id, .. }) => {
            println!("  {label:<28} DUPLICATE   already published as {existing_message_id}")
        }
        Err(VerdictError::RetryLimitExceeded { category, attempt, max_attempts }) => {
            println!("  {label:<28} REFUSED     {category} attempt {attempt} of max {max_attempts}")
        }
        Err(e) => println!("  {label:<28} ERROR       {e}"),
    }
}

pub async fn run_scenario() -> VerdictResult<()> {
    println!("=== Scenario 4: Duplicate Publish ===");
    println!();

    // Equivalent to RETRY_MAX_ATTEMPTS=3 RETRY_CATEGORY_OVERRIDES=MissingEvidence=1.
    let guard = RetryLimitGuard::from_vars([(MAX_ATTEMPTS_VAR, "3"), (CATEGORY_OVERRIDES_VAR, "MissingEvidence=1")])?;
    println!(
        "  Ceilings:        global {}, MissingEvidence {}",
        guard.config().max_attempts,
        guard.max_attempts(ErrorCategory::MissingEvidence)
    );
    println!();

    let store = InMemoryDedupeStore::new();
    let task = triage_task("login", "signs_in_with_sso");
    let reasons = vec!["smoke".to_string(), "schema".to_string()];
    let reordered = vec!["schema".to_string(), "smoke".to_string(), "schema".to_string()];
    let directive = KeyInput {
        trace_id: "trace-dup-1",
        task: &task,
        attempt_no: 0,
        reason_codes: &reasons,
    };

    let first_id = new_message_id();
    {
        let gate = PublishGate::new(guard.clone(), Arc::new(store.clone()));
        report(
            "1. first publish",
            gate.authorize_retry(&directive, ErrorCategory::SchemaViolation, &first_id),
        );
        report(
            "2. redelivery",
            gate.authorize_retry(&directive, ErrorCategory::SchemaViolation, &new_message_id()),
        );
        let shuffled = KeyInput { reason_codes: &reordered, ..directive };
        report(
            "3. reordered reason codes",
            gate.authorize_retry(&shuffled, ErrorCategory::SchemaViolation, &new_message_id()),
        );
    }

    let restarted = PublishGate::new(guard, Arc::new(store.clone()));
    report(
        "4. after restart",
        restarted.authorize_retry(&directive, ErrorCategory::SchemaViolation, &new_message_id()),
    );

    let evidence_first = KeyInput { trace_id: "trace-dup-2", ..directive };
    report(
        "5a. MissingEvidence attempt 0",
        restarted.authorize_retry(&evidence_first, ErrorCategory::MissingEvidence, &new_message_id()),
    );
    let evidence_second = KeyInput { attempt_no: 1, ..evidence_first };
    report(
        "5b. MissingEvidence attempt 1",
        restarted.authorize_retry(&evidence_second, ErrorCategory::MissingEvidence, &new_message_id()),
    );

    println!();
    let keys_recorded = store.len()?;
    println!("  Keys recorded:   {keys_recorded}");
    let recorded = first_key_owner(&store, &directive)?;
    if recorded.as_deref() != Some(first_id.as_str()) || keys_recorded != 2 {
        println!("  UNEXPECTED: first key owned by {recorded:?}");
    }
    println!();
    Ok(())
}

fn first_key_owner(store: &InMemoryDedupeStore, directive: &KeyInput<'_>) -> VerdictResult<Option<String>> {
    let key = generate_idempotency_key(directive);
    store.get(&key.key)
}
