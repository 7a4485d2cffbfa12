//! Dialect Search - recover the encoding conventions behind an order hash
//!
//! This binary:
//! 1. Loads a fixture with the order literals and the hash the contract reported
//! 2. Evaluates every dialect of the documented candidate pools
//! 3. Prints the first dialect reproducing the hash, with its typed data
//!
//! Usage:
//!   cargo run --bin dialect_search -- [fixture.json]
//!
//! Exits with status 0 on a match, 1 otherwise.

use anyhow::{Context, Result};
use marketplace_order_hash::{
    felt_to_hex, find_dialect_parallel, init_logging, parse_felt, DialectSpace, OrderDraft,
    SearchOutcome, TypedOrderPayload,
};
use serde::Deserialize;
use std::env;
use std::fs;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info};

#[derive(Deserialize)]
struct SearchFixture {
    /// Order hash reported by the marketplace contract
    target_hash: String,
    order: OrderDraft,
}

fn main() -> Result<ExitCode> {
    init_logging();

    let fixture_path = env::args()
        .nth(1)
        .unwrap_or_else(|| "search_fixture.json".to_string());

    println!("═══════════════════════════════════════════════════════════");
    println!("   Order Hash Dialect Search");
    println!("═══════════════════════════════════════════════════════════\n");

    let contents = fs::read_to_string(&fixture_path)
        .with_context(|| format!("Failed to read fixture {}", fixture_path))?;
    let fixture: SearchFixture =
        serde_json::from_str(&contents).context("Failed to parse fixture")?;
    let target = parse_felt(&fixture.target_hash).context("Invalid target hash")?;
    let order = fixture
        .order
        .to_parameters()
        .context("Invalid order literals")?;

    let space = DialectSpace::documented();
    println!("Fixture: {}", fixture_path);
    println!("  Target hash: {}", felt_to_hex(&target));
    println!("  Candidate dialects: {}", space.len());
    println!();

    let started = Instant::now();
    let outcome = find_dialect_parallel(&space, &order, target);
    info!("Search finished in {:.2?}", started.elapsed());

    match outcome {
        SearchOutcome::Found(found) => {
            println!(
                "MATCH FOUND after {} candidates across all workers",
                found.details.evaluated
            );
            println!("  Dialect: {}", found.dialect);
            println!("  Domain hash: {}", felt_to_hex(&found.details.domain_hash));
            println!("  Struct hash: {}", felt_to_hex(&found.details.struct_hash));
            println!("  Order hash:  {}", felt_to_hex(&found.details.order_hash));

            let payload = TypedOrderPayload::new(found.dialect, order)?;
            println!("\nTyped data:");
            println!("{}", serde_json::to_string_pretty(&payload.typed_data()?)?);
            Ok(ExitCode::SUCCESS)
        }
        SearchOutcome::Exhausted { evaluated } => {
            error!("No dialect reproduced the target hash");
            println!("NO MATCH after {} candidates", evaluated);
            println!("Check the order literals and extend the candidate pools.");
            Ok(ExitCode::FAILURE)
        }
    }
}
