//! Collaborators of the order signing pipeline
//!
//! The pipeline only talks to these traits, so wallets other than the
//! local private-key account can be plugged in.

use std::sync::Arc;

use async_trait::async_trait;
use starknet_crypto::Felt;
use tracing::debug;

use crate::error::Result;
use crate::rpc::StarknetRpcClient;
use crate::snip12::{felt_to_hex, public_key_from_private, sign_order_hash};
use crate::typed_data::TypedOrderPayload;
use crate::types::{OrderParameters, Signature};

/// Account that owns orders and signs their typed payload
#[async_trait]
pub trait AccountProvider: Send + Sync {
    fn address(&self) -> Felt;
    async fn get_nonce(&self, account: Felt) -> Result<Felt>;
    async fn chain_id(&self) -> Result<Felt>;
    /// Sign `payload.order_hash`.
    ///
    /// Implementations must not re-hash `payload.typed_data()`: a wallet's
    /// SNIP-12 message hash differs from the order hash the contract checks.
    async fn sign(&self, payload: &TypedOrderPayload) -> Result<Signature>;
}

/// Marketplace contract view used to confirm the locally computed hash
#[async_trait]
pub trait VerifyingContract: Send + Sync {
    async fn get_order_hash(&self, parameters: &OrderParameters, signer: Felt) -> Result<Felt>;
}

/// Private-key account reading chain state through JSON-RPC
pub struct LocalAccount {
    address: Felt,
    private_key: Felt,
    rpc: Arc<StarknetRpcClient>,
}

impl LocalAccount {
    pub fn new(address: Felt, private_key: Felt, rpc: Arc<StarknetRpcClient>) -> Self {
        Self {
            address,
            private_key,
            rpc,
        }
    }

    pub fn public_key(&self) -> Felt {
        public_key_from_private(&self.private_key)
    }
}

#[async_trait]
impl AccountProvider for LocalAccount {
    fn address(&self) -> Felt {
        self.address
    }

    async fn get_nonce(&self, account: Felt) -> Result<Felt> {
        self.rpc.get_nonce(account).await
    }

    async fn chain_id(&self) -> Result<Felt> {
        self.rpc.chain_id().await
    }

    async fn sign(&self, payload: &TypedOrderPayload) -> Result<Signature> {
        debug!(
            "Signing order {} for {}",
            felt_to_hex(&payload.order_hash),
            felt_to_hex(&self.address)
        );
        sign_order_hash(&self.private_key, &payload.order_hash)
    }
}
