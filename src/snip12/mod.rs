//! SNIP-12 style typed-data hashing for marketplace orders
//!
//! This module computes the exact order hash a verifying marketplace contract
//! derives for an `OrderParameters` struct, across every encoding "dialect"
//! the contract might use:
//!
//! - hash primitive (Poseidon or Pedersen array hash)
//! - message prefix constant
//! - address field typing (`felt` or `ContractAddress`) in type strings
//! - amount typing (`felt` or `u256`) and the four wide-integer encodings
//! - domain separator shape (name, version, chain id, optional revision)
//!
//! A dialect is either pinned (production signing) or discovered by the
//! brute-force search in [`crate::search`].
//!
//! # What Needs Confirmation
//!
//! - Exact `order_type` and `conduit_key` placeholders in the order struct
//!   (currently fixed to zero, as observed in the reference hash script)
//! - Whether the deployed contract hashes the richer ABI `OrderParameters`
//!   (with `zone`, `zone_hash`, `total_original_consideration_items`)

use starknet_crypto::Felt;

use crate::error::{MarketplaceError, Result};

mod dialect;
mod domain;
mod hash;
mod primitive;
mod registry;
mod signing;
mod struct_hash;
mod wide;


pub use dialect::{
    AddressTyping, AmountEncoding, AmountKind, DialectConfig, DomainConfig, DomainRevision,
    DomainValue, ItemTypeEncoding, MessagePrefix, StructDialect, WideEncoding,
};
pub use domain::{domain_hash, domain_hash_with, domain_type_string, encode_domain_value};
pub use hash::{
    combine_order_hash, order_hash, order_hash_breakdown, order_struct_hash, OrderHashBreakdown,
};
pub use primitive::{encode_short_string, selector_for, starknet_keccak, HashPrimitive};
pub use registry::{FieldKind, StructDef, TypeRegistry};
pub use signing::{public_key_from_private, sign_order_hash, verify_order_signature};
pub use struct_hash::{
    consideration_item_hash, item_type_element, offer_item_hash, StructHash,
    CONSIDERATION_SLOT_LITERAL, OFFER_SLOT_LITERAL, ORDER_CONDUIT_KEY, ORDER_TYPE_FULL_OPEN,
};
pub use wide::{decode_wide, encode_amount, encode_wide, WideUint};

/// STARK field prime `2^251 + 17 * 2^192 + 1`, big-endian
pub const FIELD_PRIME_BE: [u8; 32] = [
    0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x11, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01,
];

/// Convert a hex string, with or without one `0x` prefix, to a Felt
pub fn hex_to_felt(hex_str: &str) -> Result<Felt> {
    let trimmed = hex_str.trim();
    let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    parse_felt(&format!("0x{}", digits))
}

/// Convert Felt to hex string with 0x prefix
pub fn felt_to_hex(felt: &Felt) -> String {
    felt.to_hex_string()
}

/// Parse a hex (`0x` prefixed) or decimal literal into a field element.
///
/// Values `>= P` are rejected instead of being reduced.
pub fn parse_felt(literal: &str) -> Result<Felt> {
    let bytes = literal_to_be_bytes(literal)?;
    felt_from_be_bytes_checked(&pad_to_32(&bytes, literal)?, literal)
}

/// Minimal big-endian bytes of an unsigned hex or decimal literal
pub(crate) fn literal_to_be_bytes(literal: &str) -> Result<Vec<u8>> {
    let trimmed = literal.trim();
    if let Some(digits) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        if digits.is_empty() {
            return Err(MarketplaceError::InvalidLiteral(literal.to_string()));
        }
        let padded = if digits.len() % 2 == 1 {
            format!("0{}", digits)
        } else {
            digits.to_string()
        };
        hex::decode(padded).map_err(|e| MarketplaceError::InvalidLiteral(format!("'{}': {}", literal, e)))
    } else {
        num_bigint::BigUint::parse_bytes(trimmed.as_bytes(), 10)
            .map(|value| value.to_bytes_be())
            .ok_or_else(|| MarketplaceError::InvalidLiteral(literal.to_string()))
    }
}

/// Left-pad to 32 bytes, rejecting anything wider than 256 bits
pub(crate) fn pad_to_32(bytes: &[u8], literal: &str) -> Result<[u8; 32]> {
    let first_nonzero = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    let significant = &bytes[first_nonzero..];
    if significant.len() > 32 {
        return Err(MarketplaceError::FieldOutOfRange(format!(
            "'{}' is wider than 256 bits",
            literal
        )));
    }

    let mut padded = [0u8; 32];
    padded[32 - significant.len()..].copy_from_slice(significant);
    Ok(padded)
}

pub(crate) fn felt_from_be_bytes_checked(bytes: &[u8; 32], literal: &str) -> Result<Felt> {
    if *bytes >= FIELD_PRIME_BE {
        return Err(MarketplaceError::FieldOutOfRange(format!(
            "'{}' is not below the field prime",
            literal
        )));
    }
    Ok(Felt::from_bytes_be(bytes))
}
