//! Domain separator for SNIP-12

use starknet_crypto::Felt;

use super::dialect::{DialectConfig, DomainConfig, DomainValue};
use super::primitive::{encode_short_string, selector_for, HashPrimitive};
use crate::error::Result;

/// Revision 1 domain type
pub const DOMAIN_TYPE_WITH_REVISION: &str = concat!(
    "StarknetDomain(",
    "name:shortstring,",
    "version:shortstring,",
    "chainId:shortstring,",
    "revision:shortstring",
    ")"
);

/// Revision 0 domain type, no revision field
pub const DOMAIN_TYPE_NO_REVISION: &str = concat!(
    "StarkNetDomain(",
    "name:felt,",
    "version:felt,",
    "chainId:felt",
    ")"
);

pub fn domain_type_string(revision_present: bool) -> &'static str {
    if revision_present {
        DOMAIN_TYPE_WITH_REVISION
    } else {
        DOMAIN_TYPE_NO_REVISION
    }
}

/// Short string for text candidates, the literal number otherwise
pub fn encode_domain_value(value: &DomainValue) -> Result<Felt> {
    match value {
        DomainValue::Text(s) => encode_short_string(s),
        DomainValue::Numeric(n) => Ok(Felt::from(*n)),
    }
}

/// Hash the domain struct of a dialect
pub fn domain_hash(dialect: &DialectConfig) -> Result<Felt> {
    domain_hash_with(dialect.primitive, &dialect.domain)
}

pub fn domain_hash_with(primitive: HashPrimitive, domain: &DomainConfig) -> Result<Felt> {
    let type_hash = selector_for(domain_type_string(domain.revision.is_present()));
    let name = encode_domain_value(&domain.name)?;
    let version = encode_domain_value(&domain.version)?;
    let chain_id = encode_domain_value(&domain.chain_id)?;

    let hash = match domain.revision.to_felt()? {
        Some(revision) => primitive.hash(&[type_hash, name, version, chain_id, revision]),
        None => primitive.hash(&[type_hash, name, version, chain_id]),
    };
    Ok(hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snip12::DomainRevision;

    #[test]
    fn test_absent_revision_uses_three_field_sequence() {
        let domain = DomainConfig {
            revision: DomainRevision::Absent,
            ..DomainConfig::mainnet("Medialane", "1")
        };

        for primitive in HashPrimitive::ALL {
            let expected = primitive.hash(&[
                selector_for("StarkNetDomain(name:felt,version:felt,chainId:felt)"),
                encode_short_string("Medialane").unwrap(),
                encode_short_string("1").unwrap(),
                encode_short_string("SN_MAIN").unwrap(),
            ]);
            assert_eq!(domain_hash_with(primitive, &domain).unwrap(), expected);
        }
    }

    #[test]
    fn test_revision_one_uses_integer_one() {
        let domain = DomainConfig::mainnet("Medialane", "1");
        let expected = HashPrimitive::Poseidon.hash(&[
            selector_for(DOMAIN_TYPE_WITH_REVISION),
            encode_short_string("Medialane").unwrap(),
            encode_short_string("1").unwrap(),
            encode_short_string("SN_MAIN").unwrap(),
            Felt::ONE,
        ]);
        assert_eq!(
            domain_hash_with(HashPrimitive::Poseidon, &domain).unwrap(),
            expected
        );
    }

    #[test]
    fn test_revision_encodings_differ() {
        let base = DomainConfig::mainnet("Medialane", "1");
        let hashes: Vec<Felt> = DomainRevision::ALL
            .iter()
            .map(|revision| {
                let domain = DomainConfig {
                    revision: *revision,
                    ..base.clone()
                };
                domain_hash_with(HashPrimitive::Poseidon, &domain).unwrap()
            })
            .collect();
        assert_ne!(hashes[0], hashes[1]);
        assert_ne!(hashes[0], hashes[2]);
        assert_ne!(hashes[1], hashes[2]);
    }

    #[test]
    fn test_numeric_version_differs_from_text_version() {
        let text = DomainConfig::mainnet("Medialane", "1");
        let numeric = DomainConfig {
            version: DomainValue::Numeric(1),
            ..text.clone()
        };
        assert_ne!(
            domain_hash_with(HashPrimitive::Poseidon, &text).unwrap(),
            domain_hash_with(HashPrimitive::Poseidon, &numeric).unwrap()
        );
    }

    #[test]
    fn test_testnet_chain_id() {
        let mainnet = DomainConfig::mainnet("Medialane", "1");
        let testnet = DomainConfig::testnet("Medialane", "1");
        assert_eq!(testnet.chain_id, DomainValue::text("SN_SEPOLIA"));
        assert_ne!(
            domain_hash_with(HashPrimitive::Pedersen, &mainnet).unwrap(),
            domain_hash_with(HashPrimitive::Pedersen, &testnet).unwrap()
        );
    }
}
