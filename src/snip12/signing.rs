//! Order hash signing using ECDSA on the STARK curve

use starknet_crypto::{get_public_key, rfc6979_generate_k, sign as stark_sign, verify, Felt};
use tracing::debug;

use super::felt_to_hex;
use crate::error::{MarketplaceError, Result};
use crate::types::Signature;

/// Sign an order hash with a deterministic (RFC 6979) nonce
pub fn sign_order_hash(private_key: &Felt, order_hash: &Felt) -> Result<Signature> {
    let k = rfc6979_generate_k(order_hash, private_key, None);
    let signature = stark_sign(private_key, order_hash, &k)
        .map_err(|e| MarketplaceError::Signing(format!("Failed to sign: {:?}", e)))?;

    debug!("Signed order hash {}", felt_to_hex(order_hash));

    Ok(Signature {
        r: signature.r,
        s: signature.s,
    })
}

/// Check a signature over an order hash against a STARK public key
pub fn verify_order_signature(
    public_key: &Felt,
    order_hash: &Felt,
    signature: &Signature,
) -> Result<bool> {
    verify(public_key, order_hash, &signature.r, &signature.s)
        .map_err(|e| MarketplaceError::Signing(format!("Failed to verify: {:?}", e)))
}

pub fn public_key_from_private(private_key: &Felt) -> Felt {
    get_public_key(private_key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_and_verify() {
        let private_key = Felt::from(0x1234567890abcdefu64);
        let public_key = public_key_from_private(&private_key);
        let order_hash = Felt::from(0x2273c7a4u64);

        let signature = sign_order_hash(&private_key, &order_hash).unwrap();
        assert!(verify_order_signature(&public_key, &order_hash, &signature).unwrap());

        let other_hash = Felt::from(0x7addfu64);
        assert!(!verify_order_signature(&public_key, &other_hash, &signature).unwrap());
    }

    #[test]
    fn test_signing_is_deterministic() {
        let private_key = Felt::from(0xfedcba0987654321u64);
        let order_hash = Felt::from(42u64);

        let first = sign_order_hash(&private_key, &order_hash).unwrap();
        let second = sign_order_hash(&private_key, &order_hash).unwrap();
        assert_eq!(first, second);

        let (r, s) = first.to_hex();
        assert!(r.starts_with("0x"));
        assert!(s.starts_with("0x"));
    }
}
