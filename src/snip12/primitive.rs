//! Hash primitives and text encodings shared by every dialect

use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use starknet_core::utils::cairo_short_string_to_felt;
use starknet_crypto::{pedersen_hash, poseidon_hash_many, Felt};

use crate::error::{MarketplaceError, Result};

/// Compression function applied to struct element sequences.
///
/// `Poseidon` hashes the whole sequence at once. `Pedersen` is the classic
/// array hash: fold the elements into a running hash starting at zero, then
/// hash in the element count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashPrimitive {
    Poseidon,
    Pedersen,
}

impl HashPrimitive {
    pub const ALL: [HashPrimitive; 2] = [HashPrimitive::Poseidon, HashPrimitive::Pedersen];

    pub fn hash(&self, elements: &[Felt]) -> Felt {
        match self {
            HashPrimitive::Poseidon => poseidon_hash_many(elements),
            HashPrimitive::Pedersen => {
                let folded = elements
                    .iter()
                    .fold(Felt::ZERO, |acc, element| pedersen_hash(&acc, element));
                pedersen_hash(&folded, &Felt::from(elements.len() as u64))
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            HashPrimitive::Poseidon => "poseidon",
            HashPrimitive::Pedersen => "pedersen",
        }
    }
}

/// Compute starknet_keccak hash
///
/// Keccak-256 of the input with the top 6 bits cleared, so the result is a
/// 250-bit value that always fits in a field element.
pub fn starknet_keccak(input: &[u8]) -> Felt {
    let mut hasher = Keccak256::new();
    hasher.update(input);
    let result = hasher.finalize();

    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&result);
    bytes[0] &= 0x03;
    Felt::from_bytes_be(&bytes)
}

/// Selector of a canonical type string.
///
/// Always starknet_keccak, whatever hash primitive the dialect uses.
pub fn selector_for(type_string: &str) -> Felt {
    starknet_keccak(type_string.as_bytes())
}

/// Encode a short string as a Felt
///
/// ASCII only, at most 31 bytes, packed big-endian.
pub fn encode_short_string(s: &str) -> Result<Felt> {
    cairo_short_string_to_felt(s).map_err(|_| MarketplaceError::ShortString(s.to_string()))
}
