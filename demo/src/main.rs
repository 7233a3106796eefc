//! VERDICT Verification-and-Retry Core — Demo CLI
//!
//! Runs one or all of the QA triage scenarios. Each scenario wires the real
//! verification suite, retry policy, and publish gate to in-process mock
//! specialists.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- schema-retry
//!   cargo run -p demo -- flaky-selector
//!   cargo run -p demo -- slow-verifier
//!   cargo run -p demo -- duplicate-publish

mod mock_specialists;
mod scenarios;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use verdict_contracts::error::VerdictResult;

use scenarios::{duplicate_publish, flaky_selector, schema_retry, slow_verifier};

// ── CLI definition ────────────────────────────────────────────────────────────

/// VERDICT — verification and retry for specialist QA results.
///
/// Each subcommand runs one or all of the scenarios, showing how failed
/// verification turns into a retry decision and how the publish gate keeps
/// every directive exactly-once.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "VERDICT verification-and-retry demo",
    long_about = "Runs VERDICT demo scenarios showing concurrent verification,\n\
                  category-aware retry decisions, retry ceilings, and idempotent publishing."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run all four scenarios in sequence.
    RunAll,
    /// Scenario 1: schema violation retried with the schema attached.
    SchemaRetry,
    /// Scenario 2: flaky pattern routed to stability, then selector healing.
    FlakySelector,
    /// Scenario 3: a verifier overruns the suite deadline.
    SlowVerifier,
    /// Scenario 4: duplicate and over-ceiling retries refused at publish.
    DuplicatePublish,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    print_banner();

    let result = match cli.command {
        Command::RunAll => run_all().await,
        Command::SchemaRetry => schema_retry::run_scenario().await,
        Command::FlakySelector => flaky_selector::run_scenario().await,
        Command::SlowVerifier => slow_verifier::run_scenario().await,
        Command::DuplicatePublish => duplicate_publish::run_scenario().await,
    };

    match result {
        Ok(()) => {
            println!("All selected scenarios completed successfully.");
        }
        Err(e) => {
            eprintln!("Demo error: {}", e);
            std::process::exit(1);
        }
    }
}

async fn run_all() -> VerdictResult<()> {
    schema_retry::run_scenario().await?;
    flaky_selector::run_scenario().await?;
    slow_verifier::run_scenario().await?;
    duplicate_publish::run_scenario().await?;
    Ok(())
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("VERDICT — Verification and Retry Core");
    println!("QA Triage Demo");
    println!("=====================================");
    println!();
    println!("Per specialist attempt:");
    println!("  [1] Verification suite runs schema / smoke / replay checks concurrently under a deadline");
    println!("  [2] A failed verdict is categorized and the retry policy decides: retry, accept, or escalate");
    println!("  [3] Retry ceiling re-checked at the publish boundary");
    println!("  [4] Idempotency key derived and claimed; duplicates are refused");
    println!();
}
