use serde::{Deserialize, Serialize};
use starknet_crypto::Felt;

use crate::error::{MarketplaceError, Result};
use crate::snip12::{felt_to_hex, parse_felt, WideUint};

/// Asset class of an offer or consideration item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ItemType {
    Native,
    Erc20,
    Erc721,
    Erc1155,
}

impl ItemType {
    /// Numeric discriminant hashed into item structs
    pub fn discriminant(&self) -> u64 {
        match self {
            ItemType::Native => 0,
            ItemType::Erc20 => 1,
            ItemType::Erc721 => 2,
            ItemType::Erc1155 => 3,
        }
    }

    pub fn to_felt(&self) -> Felt {
        Felt::from(self.discriminant())
    }

    pub fn label(&self) -> &'static str {
        match self {
            ItemType::Native => "NATIVE",
            ItemType::Erc20 => "ERC20",
            ItemType::Erc721 => "ERC721",
            ItemType::Erc1155 => "ERC1155",
        }
    }
}

/// Asset the offerer gives up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferItem {
    pub item_type: ItemType,
    pub token: Felt,
    pub identifier_or_criteria: WideUint,
    pub start_amount: WideUint,
    pub end_amount: WideUint,
}

/// Asset the offerer expects in return, and who receives it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsiderationItem {
    pub item_type: ItemType,
    pub token: Felt,
    pub identifier_or_criteria: WideUint,
    pub start_amount: WideUint,
    pub end_amount: WideUint,
    pub recipient: Felt,
}

/// Logical, dialect-independent order fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderParameters {
    pub offerer: Felt,
    pub offer: OfferItem,
    pub consideration: ConsiderationItem,
    pub start_time: u64,
    pub end_time: u64,
    pub salt: Felt,
    /// Per-account replay counter read from the verifying contract
    pub nonce: Felt,
}

impl OrderParameters {
    /// Reject orders whose validity window is empty or inverted
    pub fn validate(&self) -> Result<()> {
        if self.end_time <= self.start_time {
            return Err(MarketplaceError::InvalidOrder(format!(
                "end_time {} must be after start_time {}",
                self.end_time, self.start_time
            )));
        }
        Ok(())
    }

    pub fn with_nonce(mut self, nonce: Felt) -> Self {
        self.nonce = nonce;
        self
    }
}

/// Item literals as they appear in config files and fixtures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDraft {
    pub item_type: ItemType,
    pub token: String,
    #[serde(default = "default_zero")]
    pub identifier_or_criteria: String,
    pub start_amount: String,
    pub end_amount: String,
    #[serde(default)]
    pub recipient: Option<String>,
}

/// Order literals as they appear in config files and fixtures
///
/// Every literal is hex (`0x`) or decimal and is range checked on conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDraft {
    pub offerer: String,
    pub offer: ItemDraft,
    pub consideration: ItemDraft,
    #[serde(default)]
    pub start_time: u64,
    pub end_time: u64,
    pub salt: String,
    #[serde(default = "default_zero")]
    pub nonce: String,
}

fn default_zero() -> String {
    "0x0".to_string()
}

impl ItemDraft {
    pub fn to_offer_item(&self) -> Result<OfferItem> {
        Ok(OfferItem {
            item_type: self.item_type,
            token: parse_felt(&self.token)?,
            identifier_or_criteria: WideUint::parse(&self.identifier_or_criteria)?,
            start_amount: WideUint::parse(&self.start_amount)?,
            end_amount: WideUint::parse(&self.end_amount)?,
        })
    }

    /// `default_recipient` is used when the draft names no recipient
    pub fn to_consideration_item(&self, default_recipient: Felt) -> Result<ConsiderationItem> {
        let recipient = match &self.recipient {
            Some(literal) => parse_felt(literal)?,
            None => default_recipient,
        };
        Ok(ConsiderationItem {
            item_type: self.item_type,
            token: parse_felt(&self.token)?,
            identifier_or_criteria: WideUint::parse(&self.identifier_or_criteria)?,
            start_amount: WideUint::parse(&self.start_amount)?,
            end_amount: WideUint::parse(&self.end_amount)?,
            recipient,
        })
    }
}

impl OrderDraft {
    pub fn to_parameters(&self) -> Result<OrderParameters> {
        let offerer = parse_felt(&self.offerer)?;
        Ok(OrderParameters {
            offerer,
            offer: self.offer.to_offer_item()?,
            consideration: self.consideration.to_consideration_item(offerer)?,
            start_time: self.start_time,
            end_time: self.end_time,
            salt: parse_felt(&self.salt)?,
            nonce: parse_felt(&self.nonce)?,
        })
    }
}

/// ECDSA signature on the STARK curve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub r: Felt,
    pub s: Felt,
}

impl Signature {
    pub fn to_felts(&self) -> [Felt; 2] {
        [self.r, self.s]
    }

    pub fn to_hex(&self) -> (String, String) {
        (felt_to_hex(&self.r), felt_to_hex(&self.s))
    }
}

/// Order whose hash was checked against the contract and then signed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedOrder {
    pub parameters: OrderParameters,
    pub order_hash: Felt,
    pub signature: Signature,
}
