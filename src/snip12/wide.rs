//! Wide (256-bit) integers and their element encodings

use std::fmt;

use starknet_crypto::Felt;

use super::dialect::{AmountEncoding, WideEncoding};
use super::primitive::{selector_for, HashPrimitive};
use super::{felt_from_be_bytes_checked, literal_to_be_bytes, pad_to_32};
use crate::error::Result;

/// Type string of the nested `u256` struct
pub const U256_TYPE_STRING: &str = "u256(low:felt,high:felt)";

/// 256-bit unsigned integer split into two 128-bit limbs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WideUint {
    pub low: u128,
    pub high: u128,
}

impl WideUint {
    pub const ZERO: WideUint = WideUint { low: 0, high: 0 };

    pub fn from_limbs(low: u128, high: u128) -> Self {
        Self { low, high }
    }

    /// Parse a hex (`0x` prefixed) or decimal literal of at most 256 bits
    pub fn parse(literal: &str) -> Result<Self> {
        let bytes = pad_to_32(&literal_to_be_bytes(literal)?, literal)?;
        Ok(Self::from_be_bytes(&bytes))
    }

    pub fn from_be_bytes(bytes: &[u8; 32]) -> Self {
        let mut high = [0u8; 16];
        let mut low = [0u8; 16];
        high.copy_from_slice(&bytes[..16]);
        low.copy_from_slice(&bytes[16..]);
        Self {
            low: u128::from_be_bytes(low),
            high: u128::from_be_bytes(high),
        }
    }

    pub fn to_be_bytes(&self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        bytes[..16].copy_from_slice(&self.high.to_be_bytes());
        bytes[16..].copy_from_slice(&self.low.to_be_bytes());
        bytes
    }

    pub fn low_felt(&self) -> Felt {
        Felt::from(self.low)
    }

    pub fn high_felt(&self) -> Felt {
        Felt::from(self.high)
    }

    /// Single field element, rejecting values at or above the field prime
    pub fn to_felt(&self) -> Result<Felt> {
        felt_from_be_bytes_checked(&self.to_be_bytes(), &self.to_string())
    }
}

impl From<u128> for WideUint {
    fn from(value: u128) -> Self {
        Self { low: value, high: 0 }
    }
}

impl From<u64> for WideUint {
    fn from(value: u64) -> Self {
        Self::from(value as u128)
    }
}

impl fmt::Display for WideUint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.high == 0 {
            write!(f, "{:#x}", self.low)
        } else {
            write!(f, "{:#x}{:032x}", self.high, self.low)
        }
    }
}

/// Lay out a wide value per the wide encoding
pub fn encode_wide(value: &WideUint, encoding: WideEncoding, primitive: HashPrimitive) -> Vec<Felt> {
    let low = value.low_felt();
    let high = value.high_felt();
    match encoding {
        WideEncoding::TwoLimbPair => vec![low, high],
        WideEncoding::SwappedPair => vec![high, low],
        WideEncoding::PairHash => vec![primitive.hash(&[low, high])],
        WideEncoding::NestedStructHash => {
            vec![primitive.hash(&[selector_for(U256_TYPE_STRING), low, high])]
        }
    }
}

/// Lay out an amount-like field per the amount encoding
pub fn encode_amount(
    value: &WideUint,
    encoding: AmountEncoding,
    primitive: HashPrimitive,
) -> Result<Vec<Felt>> {
    match encoding {
        AmountEncoding::Felt => Ok(vec![value.to_felt()?]),
        AmountEncoding::U256(wide) => Ok(encode_wide(value, wide, primitive)),
    }
}

/// Recover a wide value from its limb encoding.
///
/// Returns `None` for the hashing encodings, for the wrong element count, or
/// for limbs that do not fit in 128 bits.
pub fn decode_wide(elements: &[Felt], encoding: WideEncoding) -> Option<WideUint> {
    let (low, high) = match (encoding, elements) {
        (WideEncoding::TwoLimbPair, [low, high]) => (low, high),
        (WideEncoding::SwappedPair, [high, low]) => (low, high),
        _ => return None,
    };
    Some(WideUint {
        low: felt_to_u128(low)?,
        high: felt_to_u128(high)?,
    })
}

fn felt_to_u128(felt: &Felt) -> Option<u128> {
    let bytes = felt.to_bytes_be();
    if bytes[..16].iter().any(|b| *b != 0) {
        return None;
    }
    let mut limb = [0u8; 16];
    limb.copy_from_slice(&bytes[16..]);
    Some(u128::from_be_bytes(limb))
}
