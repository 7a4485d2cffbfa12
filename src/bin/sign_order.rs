//! Sign Order - prepare and sign a marketplace order
//!
//! This binary:
//! 1. Loads the order template and pinned dialect from config.json
//! 2. Opens the order now, for `order_ttl_secs`
//! 3. Checks the local hash against the marketplace contract
//! 4. Signs and prints the `register_order` calldata
//!
//! Usage:
//!   cargo run --bin sign_order
//!
//! Secrets come from ACCOUNT_ADDRESS and PRIVATE_KEY (.env supported).
//! MARKETPLACE_CONFIG overrides the config path.

use anyhow::{Context, Result};
use dotenv::dotenv;
use marketplace_order_hash::{
    felt_to_hex, init_logging, register_order_calldata, validity_window, AccountCredentials,
    LocalAccount, MarketplaceConfig, OrderPreparer, StarknetRpcClient,
};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    init_logging();

    println!("═══════════════════════════════════════════════════════════");
    println!("   Marketplace Order Signer");
    println!("═══════════════════════════════════════════════════════════\n");

    let config = MarketplaceConfig::load().context("Failed to load configuration")?;
    let credentials = AccountCredentials::from_env()?;
    let marketplace = config.marketplace_address()?;

    println!("Configuration:");
    println!("  RPC: {}", config.rpc_url);
    println!("  Marketplace: {}", felt_to_hex(&marketplace));
    println!("  Dialect: {}", config.dialect);
    println!("  Order TTL: {} seconds", config.order_ttl_secs);
    println!();

    let rpc = Arc::new(StarknetRpcClient::new(&config.rpc_url, marketplace)?);
    let account = Arc::new(LocalAccount::new(
        credentials.address,
        credentials.private_key,
        rpc.clone(),
    ));
    let preparer = OrderPreparer::new(config.dialect.clone(), account, rpc);

    let now = u64::try_from(chrono::Utc::now().timestamp()).context("Clock before epoch")?;
    let (start_time, end_time) = validity_window(now, config.order_ttl_secs);
    let mut draft = config.order.to_parameters()?;
    draft.start_time = start_time;
    draft.end_time = end_time;
    info!("Order valid from {} to {}", start_time, end_time);

    let signed = preparer.prepare(draft).await?;
    let (r, s) = signed.signature.to_hex();

    println!("Order hash: {}", felt_to_hex(&signed.order_hash));
    println!("Signature:");
    println!("  r: {}", r);
    println!("  s: {}", s);
    println!("\nregister_order calldata:");
    for felt in register_order_calldata(&signed) {
        println!("  {}", felt_to_hex(&felt));
    }

    Ok(())
}
