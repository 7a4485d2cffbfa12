//! Encoding dialects
//!
//! Every axis along which two contracts can disagree about an order hash is a
//! finite enum here, and a `DialectConfig` is one concrete choice per axis.

use std::fmt;

use serde::{Deserialize, Serialize};
use starknet_crypto::Felt;

use super::primitive::{encode_short_string, starknet_keccak, HashPrimitive};
use crate::error::Result;

/// Constant placed first in the final message hash
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessagePrefix {
    /// Short string "StarkNet Message"
    StarkNetShortString,
    /// Short string "Starknet Message"
    StarknetShortString,
    /// starknet_keccak("StarkNet Message")
    StarkNetKeccak,
}

impl MessagePrefix {
    pub const ALL: [MessagePrefix; 3] = [
        MessagePrefix::StarkNetShortString,
        MessagePrefix::StarknetShortString,
        MessagePrefix::StarkNetKeccak,
    ];

    pub fn to_felt(&self) -> Result<Felt> {
        match self {
            MessagePrefix::StarkNetShortString => encode_short_string("StarkNet Message"),
            MessagePrefix::StarknetShortString => encode_short_string("Starknet Message"),
            MessagePrefix::StarkNetKeccak => Ok(starknet_keccak(b"StarkNet Message")),
        }
    }
}

/// Type tag used for `offerer`, `token` and `recipient` in type strings.
///
/// Only the selector changes; the numeric value is the same felt either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressTyping {
    Felt,
    ContractAddress,
}

impl AddressTyping {
    pub const ALL: [AddressTyping; 2] = [AddressTyping::Felt, AddressTyping::ContractAddress];
}

/// Element hashed right after the selector of an item struct
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemTypeEncoding {
    /// Fixed slot literal: 2 for the offer item, 1 for the consideration item
    #[default]
    SlotLiteral,
    /// Numeric item type (NATIVE 0, ERC20 1, ERC721 2, ERC1155 3)
    Discriminant,
    /// Item type label as a short string, e.g. 'ERC20'
    ShortString,
}

impl ItemTypeEncoding {
    pub const ALL: [ItemTypeEncoding; 3] = [
        ItemTypeEncoding::SlotLiteral,
        ItemTypeEncoding::Discriminant,
        ItemTypeEncoding::ShortString,
    ];
}

/// How a `u256` value is laid out in the parent element sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WideEncoding {
    /// `low, high`
    TwoLimbPair,
    /// `high, low`
    SwappedPair,
    /// `hash([low, high])`
    PairHash,
    /// `hash([selector("u256(low:felt,high:felt)"), low, high])`
    NestedStructHash,
}

impl WideEncoding {
    pub const ALL: [WideEncoding; 4] = [
        WideEncoding::TwoLimbPair,
        WideEncoding::SwappedPair,
        WideEncoding::PairHash,
        WideEncoding::NestedStructHash,
    ];

    /// Number of elements the encoding contributes
    pub fn width(&self) -> usize {
        match self {
            WideEncoding::TwoLimbPair | WideEncoding::SwappedPair => 2,
            WideEncoding::PairHash | WideEncoding::NestedStructHash => 1,
        }
    }
}

/// Amount typing without the wide sub-dialect, used to describe search pools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountKind {
    Felt,
    U256,
}

/// Typing of `identifier_or_criteria`, `start_amount` and `end_amount`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountEncoding {
    /// Single felt; the value must be below the field prime
    Felt,
    /// `u256` in the type string, laid out per the wide encoding
    U256(WideEncoding),
}

impl AmountEncoding {
    pub fn kind(&self) -> AmountKind {
        match self {
            AmountEncoding::Felt => AmountKind::Felt,
            AmountEncoding::U256(_) => AmountKind::U256,
        }
    }
}

/// Struct-type dialect: which type-string family and value layout to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StructDialect {
    pub addresses: AddressTyping,
    pub amounts: AmountEncoding,
    #[serde(default)]
    pub item_types: ItemTypeEncoding,
}

impl StructDialect {
    /// Struct dialect hashing slot literals for item types
    pub fn new(addresses: AddressTyping, amounts: AmountEncoding) -> Self {
        Self {
            addresses,
            amounts,
            item_types: ItemTypeEncoding::SlotLiteral,
        }
    }

    pub fn with_item_types(self, item_types: ItemTypeEncoding) -> Self {
        Self { item_types, ..self }
    }
}

/// Revision field of the domain struct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainRevision {
    /// Revision present, encoded as the integer 1
    FeltOne,
    /// Revision present, encoded as the short string "1"
    ShortStringOne,
    /// Three-field domain without revision
    Absent,
}

impl DomainRevision {
    pub const ALL: [DomainRevision; 3] = [
        DomainRevision::FeltOne,
        DomainRevision::ShortStringOne,
        DomainRevision::Absent,
    ];

    pub fn is_present(&self) -> bool {
        !matches!(self, DomainRevision::Absent)
    }

    pub fn to_felt(&self) -> Result<Option<Felt>> {
        match self {
            DomainRevision::FeltOne => Ok(Some(Felt::ONE)),
            DomainRevision::ShortStringOne => encode_short_string("1").map(Some),
            DomainRevision::Absent => Ok(None),
        }
    }
}

/// Domain name, version or chain id candidate
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainValue {
    /// Encoded as a short string
    Text(String),
    /// Encoded as the literal number
    Numeric(u128),
}

impl DomainValue {
    pub fn text(s: &str) -> Self {
        DomainValue::Text(s.to_string())
    }
}

impl fmt::Display for DomainValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainValue::Text(s) => write!(f, "'{}'", s),
            DomainValue::Numeric(n) => write!(f, "{}", n),
        }
    }
}

/// Domain separator fields
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DomainConfig {
    pub name: DomainValue,
    pub version: DomainValue,
    pub chain_id: DomainValue,
    pub revision: DomainRevision,
}

impl DomainConfig {
    /// SNIP-12 revision 1 domain on Starknet mainnet
    pub fn mainnet(name: &str, version: &str) -> Self {
        Self {
            name: DomainValue::text(name),
            version: DomainValue::text(version),
            chain_id: DomainValue::text("SN_MAIN"),
            revision: DomainRevision::FeltOne,
        }
    }

    /// SNIP-12 revision 1 domain on Starknet Sepolia
    pub fn testnet(name: &str, version: &str) -> Self {
        Self {
            chain_id: DomainValue::text("SN_SEPOLIA"),
            ..Self::mainnet(name, version)
        }
    }
}

/// One concrete choice across every encoding axis
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DialectConfig {
    pub prefix: MessagePrefix,
    pub primitive: HashPrimitive,
    pub structs: StructDialect,
    pub domain: DomainConfig,
}

impl DialectConfig {
    pub fn hash(&self, elements: &[Felt]) -> Felt {
        self.primitive.hash(elements)
    }
}

impl fmt::Display for DialectConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "prefix={:?} hash={} addresses={:?} amounts={:?} item_types={:?} name={} version={} chain_id={} revision={:?}",
            self.prefix,
            self.primitive.name(),
            self.structs.addresses,
            self.structs.amounts,
            self.structs.item_types,
            self.domain.name,
            self.domain.version,
            self.domain.chain_id,
            self.domain.revision,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_candidates_are_distinct() {
        let felts: Vec<Felt> = MessagePrefix::ALL
            .iter()
            .map(|p| p.to_felt().unwrap())
            .collect();
        assert_ne!(felts[0], felts[1]);
        assert_ne!(felts[0], felts[2]);
        assert_ne!(felts[1], felts[2]);
    }

    #[test]
    fn test_revision_encodings() {
        assert_eq!(DomainRevision::FeltOne.to_felt().unwrap(), Some(Felt::ONE));
        assert_eq!(
            DomainRevision::ShortStringOne.to_felt().unwrap(),
            Some(Felt::from(0x31u64))
        );
        assert_eq!(DomainRevision::Absent.to_felt().unwrap(), None);
    }

    #[test]
    fn test_dialect_config_json_roundtrip() {
        let dialect = DialectConfig {
            prefix: MessagePrefix::StarkNetShortString,
            primitive: HashPrimitive::Poseidon,
            structs: StructDialect::new(
                AddressTyping::ContractAddress,
                AmountEncoding::U256(WideEncoding::NestedStructHash),
            )
            .with_item_types(ItemTypeEncoding::ShortString),
            domain: DomainConfig::testnet("Medialane", "1"),
        };

        let json = serde_json::to_string(&dialect).unwrap();
        let parsed: DialectConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, dialect);
    }

    #[test]
    fn test_item_types_default_when_absent() {
        let json = r#"{"addresses":"felt","amounts":"felt"}"#;
        let structs: StructDialect = serde_json::from_str(json).unwrap();
        assert_eq!(structs.item_types, ItemTypeEncoding::SlotLiteral);
        assert_eq!(
            structs,
            StructDialect::new(AddressTyping::Felt, AmountEncoding::Felt)
        );
    }
}
