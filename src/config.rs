use std::env;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use starknet_crypto::Felt;
use tracing::info;

use crate::error::{MarketplaceError, Result};
use crate::snip12::{parse_felt, DialectConfig};
use crate::types::OrderDraft;

/// Environment variable overriding the config file location
pub const CONFIG_PATH_ENV: &str = "MARKETPLACE_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Settings of the signing tool, read from `config.json`
#[derive(Debug, Clone, Deserialize)]
pub struct MarketplaceConfig {
    pub rpc_url: String,
    pub marketplace_address: String,
    /// Dialect the marketplace contract is known to hash with
    pub dialect: DialectConfig,
    #[serde(default = "default_order_ttl_secs")]
    pub order_ttl_secs: u64,
    pub order: OrderDraft,
}

fn default_order_ttl_secs() -> u64 {
    7 * 24 * 3600 // one week
}

impl MarketplaceConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        if config.order_ttl_secs == 0 {
            return Err(MarketplaceError::Config(
                "order_ttl_secs must be positive".to_string(),
            ));
        }
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let config = Self::from_json_str(&contents)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load from `MARKETPLACE_CONFIG`, falling back to `config.json`
    pub fn load() -> Result<Self> {
        let path = env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::from_file(path)
    }

    pub fn marketplace_address(&self) -> Result<Felt> {
        parse_felt(&self.marketplace_address)
    }
}

/// Account secrets, kept out of the config file
#[derive(Clone)]
pub struct AccountCredentials {
    pub address: Felt,
    pub private_key: Felt,
}

impl AccountCredentials {
    /// Read `ACCOUNT_ADDRESS` and `PRIVATE_KEY`
    pub fn from_env() -> Result<Self> {
        let address = env::var("ACCOUNT_ADDRESS")
            .map_err(|_| MarketplaceError::Config("ACCOUNT_ADDRESS not set".to_string()))?;
        let private_key = env::var("PRIVATE_KEY")
            .map_err(|_| MarketplaceError::Config("PRIVATE_KEY not set".to_string()))?;
        Self::from_literals(&address, &private_key)
    }

    pub fn from_literals(address: &str, private_key: &str) -> Result<Self> {
        Ok(Self {
            address: parse_felt(address)?,
            private_key: parse_felt(private_key)?,
        })
    }
}

impl std::fmt::Debug for AccountCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountCredentials")
            .field("address", &self.address)
            .field("private_key", &"<redacted>")
            .finish()
    }
}
