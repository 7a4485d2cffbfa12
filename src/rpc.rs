use crate::account::VerifyingContract;
use crate::calldata::order_parameters_calldata;
use crate::error::{MarketplaceError, Result};
use crate::snip12::{felt_to_hex, hex_to_felt};
use crate::types::OrderParameters;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use starknet_core::utils::get_selector_from_name;
use starknet_crypto::Felt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, error, info};

/// Marketplace entry point returning the contract-side order hash
pub const GET_ORDER_HASH_ENTRY_POINT: &str = "get_order_hash";

/// Marketplace entry point returning an account's current order nonce
pub const NONCES_ENTRY_POINT: &str = "nonces";

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcError>,
}

/// Read-only Starknet JSON-RPC client bound to one marketplace contract
pub struct StarknetRpcClient {
    client: Client,
    rpc_url: String,
    marketplace_address: Felt,
    request_id: AtomicU64,
}

impl StarknetRpcClient {
    /// Create a client for the node at `rpc_url`
    pub fn new(rpc_url: &str, marketplace_address: Felt) -> Result<Self> {
        url::Url::parse(rpc_url)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("marketplace-order-hash/0.1.0")
            .build()?;

        Ok(Self {
            client,
            rpc_url: rpc_url.to_string(),
            marketplace_address,
            request_id: AtomicU64::new(1),
        })
    }

    pub fn marketplace_address(&self) -> Felt {
        self.marketplace_address
    }

    async fn request<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let body = JsonRpcRequest {
            jsonrpc: "2.0",
            id: self.request_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        debug!("JSON-RPC {} -> {}", method, self.rpc_url);

        let response = self.client.post(&self.rpc_url).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!("RPC error: {} - {}", status, error_text);
            return Err(MarketplaceError::Rpc(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let rpc_response: JsonRpcResponse<T> = response.json().await?;
        match (rpc_response.result, rpc_response.error) {
            (Some(result), _) => Ok(result),
            (None, Some(e)) => {
                error!("{} failed: {} {}", method, e.code, e.message);
                Err(MarketplaceError::Rpc(format!("{}: {}", e.code, e.message)))
            }
            (None, None) => Err(MarketplaceError::Rpc(format!(
                "{}: empty response",
                method
            ))),
        }
    }

    /// `starknet_call` against the latest block
    pub async fn call(
        &self,
        contract: Felt,
        entry_point: &str,
        calldata: &[Felt],
    ) -> Result<Vec<Felt>> {
        let params = call_params(contract, entry_point, calldata)?;
        let result: Vec<String> = self.request("starknet_call", params).await?;
        result.iter().map(|s| hex_to_felt(s)).collect()
    }

    pub async fn chain_id(&self) -> Result<Felt> {
        let result: String = self.request("starknet_chainId", json!([])).await?;
        let chain_id = hex_to_felt(&result)?;
        info!("Connected to chain {}", felt_to_hex(&chain_id));
        Ok(chain_id)
    }

    /// Current order nonce of `account` on the marketplace
    pub async fn get_nonce(&self, account: Felt) -> Result<Felt> {
        let result = self
            .call(self.marketplace_address, NONCES_ENTRY_POINT, &[account])
            .await?;
        first_felt(NONCES_ENTRY_POINT, &result)
    }
}

#[async_trait]
impl VerifyingContract for StarknetRpcClient {
    async fn get_order_hash(&self, parameters: &OrderParameters, signer: Felt) -> Result<Felt> {
        let mut calldata = order_parameters_calldata(parameters);
        calldata.push(signer);
        let result = self
            .call(self.marketplace_address, GET_ORDER_HASH_ENTRY_POINT, &calldata)
            .await?;
        first_felt(GET_ORDER_HASH_ENTRY_POINT, &result)
    }
}

fn call_params(contract: Felt, entry_point: &str, calldata: &[Felt]) -> Result<Value> {
    let selector = get_selector_from_name(entry_point)
        .map_err(|e| MarketplaceError::Rpc(format!("bad entry point '{}': {}", entry_point, e)))?;
    let calldata: Vec<String> = calldata.iter().map(felt_to_hex).collect();
    Ok(json!({
        "request": {
            "contract_address": felt_to_hex(&contract),
            "entry_point_selector": felt_to_hex(&selector),
            "calldata": calldata,
        },
        "block_id": "latest",
    }))
}

fn first_felt(entry_point: &str, result: &[Felt]) -> Result<Felt> {
    result
        .first()
        .copied()
        .ok_or_else(|| MarketplaceError::Rpc(format!("{} returned no value", entry_point)))
}
