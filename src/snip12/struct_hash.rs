//! Struct hashes of offer items, consideration items and order parameters

use starknet_crypto::Felt;

use super::dialect::{DialectConfig, ItemTypeEncoding, StructDialect};
use super::primitive::{encode_short_string, HashPrimitive};
use super::registry::{TypeRegistry, CONSIDERATION_ITEM, OFFER_ITEM, ORDER_PARAMETERS};
use super::wide::{encode_amount, WideUint};
use crate::error::Result;
use crate::types::{ConsiderationItem, ItemType, OfferItem, OrderParameters};

/// `order_type` placeholder: FULL_OPEN
pub const ORDER_TYPE_FULL_OPEN: Felt = Felt::ZERO;

/// `conduit_key` placeholder
pub const ORDER_CONDUIT_KEY: Felt = Felt::ZERO;

/// Slot literal hashed for the single offer item
pub const OFFER_SLOT_LITERAL: Felt = Felt::TWO;

/// Slot literal hashed for the single consideration item
pub const CONSIDERATION_SLOT_LITERAL: Felt = Felt::ONE;

/// Element following the selector of an item struct
pub fn item_type_element(
    item_type: ItemType,
    slot_literal: Felt,
    encoding: ItemTypeEncoding,
) -> Result<Felt> {
    match encoding {
        ItemTypeEncoding::SlotLiteral => Ok(slot_literal),
        ItemTypeEncoding::Discriminant => Ok(item_type.to_felt()),
        ItemTypeEncoding::ShortString => encode_short_string(item_type.label()),
    }
}

/// Struct hash under a dialect
pub trait StructHash {
    fn struct_hash_with(&self, primitive: HashPrimitive, structs: StructDialect) -> Result<Felt>;

    fn struct_hash(&self, dialect: &DialectConfig) -> Result<Felt> {
        self.struct_hash_with(dialect.primitive, dialect.structs)
    }
}

impl StructHash for OfferItem {
    fn struct_hash_with(&self, primitive: HashPrimitive, structs: StructDialect) -> Result<Felt> {
        offer_item_hash(self, primitive, structs)
    }
}

impl StructHash for ConsiderationItem {
    fn struct_hash_with(&self, primitive: HashPrimitive, structs: StructDialect) -> Result<Felt> {
        consideration_item_hash(self, primitive, structs)
    }
}

impl StructHash for OrderParameters {
    fn struct_hash_with(&self, primitive: HashPrimitive, structs: StructDialect) -> Result<Felt> {
        let registry = TypeRegistry::for_structs(structs);
        let offer_hash = offer_item_hash(&self.offer, primitive, structs)?;
        let consideration_hash = consideration_item_hash(&self.consideration, primitive, structs)?;

        // NOTE: start_time and nonce are not part of the hashed struct
        Ok(primitive.hash(&[
            registry.selector(ORDER_PARAMETERS)?,
            self.offerer,
            offer_hash,
            consideration_hash,
            ORDER_TYPE_FULL_OPEN,
            Felt::from(self.end_time),
            self.salt,
            ORDER_CONDUIT_KEY,
        ]))
    }
}

pub fn offer_item_hash(
    item: &OfferItem,
    primitive: HashPrimitive,
    structs: StructDialect,
) -> Result<Felt> {
    let registry = TypeRegistry::for_structs(structs);
    let mut elements = vec![registry.selector(OFFER_ITEM)?];
    push_item_fields(
        &mut elements,
        item_type_element(item.item_type, OFFER_SLOT_LITERAL, structs.item_types)?,
        item.token,
        [&item.identifier_or_criteria, &item.start_amount, &item.end_amount],
        primitive,
        structs,
    )?;
    Ok(primitive.hash(&elements))
}

pub fn consideration_item_hash(
    item: &ConsiderationItem,
    primitive: HashPrimitive,
    structs: StructDialect,
) -> Result<Felt> {
    let registry = TypeRegistry::for_structs(structs);
    let mut elements = vec![registry.selector(CONSIDERATION_ITEM)?];
    push_item_fields(
        &mut elements,
        item_type_element(item.item_type, CONSIDERATION_SLOT_LITERAL, structs.item_types)?,
        item.token,
        [&item.identifier_or_criteria, &item.start_amount, &item.end_amount],
        primitive,
        structs,
    )?;
    elements.push(item.recipient);
    Ok(primitive.hash(&elements))
}

/// Shared `item_type, token, identifier_or_criteria, start_amount, end_amount` layout
fn push_item_fields(
    elements: &mut Vec<Felt>,
    item_type: Felt,
    token: Felt,
    amounts: [&WideUint; 3],
    primitive: HashPrimitive,
    structs: StructDialect,
) -> Result<()> {
    elements.push(item_type);
    elements.push(token);
    for amount in amounts {
        elements.extend(encode_amount(amount, structs.amounts, primitive)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MarketplaceError;
    use crate::snip12::{selector_for, AddressTyping, AmountEncoding, WideEncoding};
    use crate::types::ItemType;

    fn offer() -> OfferItem {
        OfferItem {
            item_type: ItemType::Erc20,
            token: Felt::from(0x60bbu64),
            identifier_or_criteria: WideUint::ZERO,
            start_amount: WideUint::from(1u64),
            end_amount: WideUint::from(1u64),
        }
    }

    fn structs(amounts: AmountEncoding) -> StructDialect {
        StructDialect::new(AddressTyping::Felt, amounts)
    }

    #[test]
    fn test_offer_hash_felt_layout() {
        let item = offer();
        let expected = HashPrimitive::Poseidon.hash(&[
            selector_for(
                "OfferItem(item_type:felt,token:felt,identifier_or_criteria:felt,start_amount:felt,end_amount:felt)",
            ),
            OFFER_SLOT_LITERAL,
            item.token,
            Felt::ZERO,
            Felt::ONE,
            Felt::ONE,
        ]);

        let hash = offer_item_hash(&item, HashPrimitive::Poseidon, structs(AmountEncoding::Felt)).unwrap();
        assert_eq!(hash, expected);
    }

    #[test]
    fn test_consideration_hash_appends_recipient() {
        let item = ConsiderationItem {
            item_type: ItemType::Erc721,
            token: Felt::from(0xc24u64),
            identifier_or_criteria: WideUint::from(1u64),
            start_amount: WideUint::from(1u64),
            end_amount: WideUint::from(1u64),
            recipient: Felt::from(0x5f9u64),
        };
        let dialect = structs(AmountEncoding::U256(WideEncoding::TwoLimbPair));
        let registry = TypeRegistry::for_structs(dialect);

        let expected = HashPrimitive::Pedersen.hash(&[
            registry.selector(CONSIDERATION_ITEM).unwrap(),
            CONSIDERATION_SLOT_LITERAL,
            item.token,
            Felt::ONE,
            Felt::ZERO,
            Felt::ONE,
            Felt::ZERO,
            Felt::ONE,
            Felt::ZERO,
            item.recipient,
        ]);

        let hash = consideration_item_hash(&item, HashPrimitive::Pedersen, dialect).unwrap();
        assert_eq!(hash, expected);
    }

    #[test]
    fn test_every_wide_encoding_changes_offer_hash() {
        let mut item = offer();
        item.start_amount = WideUint::from_limbs(3, 7);
        item.end_amount = WideUint::from_limbs(3, 7);

        let hashes: Vec<Felt> = WideEncoding::ALL
            .iter()
            .map(|wide| {
                offer_item_hash(&item, HashPrimitive::Poseidon, structs(AmountEncoding::U256(*wide)))
                    .unwrap()
            })
            .collect();

        for i in 0..hashes.len() {
            for j in (i + 1)..hashes.len() {
                assert_ne!(hashes[i], hashes[j], "{:?} vs {:?}", WideEncoding::ALL[i], WideEncoding::ALL[j]);
            }
        }
    }

    #[test]
    fn test_address_typing_changes_selector_only() {
        let item = offer();
        let felt = offer_item_hash(&item, HashPrimitive::Poseidon, structs(AmountEncoding::Felt)).unwrap();
        let address = offer_item_hash(
            &item,
            HashPrimitive::Poseidon,
            StructDialect::new(AddressTyping::ContractAddress, AmountEncoding::Felt),
        )
        .unwrap();
        assert_ne!(felt, address);
    }

    #[test]
    fn test_felt_amounts_reject_values_above_prime() {
        let mut item = offer();
        item.start_amount = WideUint::from_limbs(u128::MAX, u128::MAX);

        let result = offer_item_hash(&item, HashPrimitive::Poseidon, structs(AmountEncoding::Felt));
        assert!(matches!(result, Err(MarketplaceError::FieldOutOfRange(_))));

        // The same value is fine as a u256
        let wide = offer_item_hash(
            &item,
            HashPrimitive::Poseidon,
            structs(AmountEncoding::U256(WideEncoding::TwoLimbPair)),
        );
        assert!(wide.is_ok());
    }

    #[test]
    fn test_item_type_encodings() {
        let erc20 = ItemType::Erc20;
        assert_eq!(
            item_type_element(erc20, OFFER_SLOT_LITERAL, ItemTypeEncoding::SlotLiteral).unwrap(),
            Felt::TWO
        );
        assert_eq!(
            item_type_element(erc20, OFFER_SLOT_LITERAL, ItemTypeEncoding::Discriminant).unwrap(),
            Felt::ONE
        );
        // 'ERC20'
        assert_eq!(
            item_type_element(erc20, OFFER_SLOT_LITERAL, ItemTypeEncoding::ShortString).unwrap(),
            Felt::from(0x4552433230u64)
        );

        let item = offer();
        let hashes: Vec<Felt> = ItemTypeEncoding::ALL
            .iter()
            .map(|encoding| {
                let dialect = structs(AmountEncoding::Felt).with_item_types(*encoding);
                offer_item_hash(&item, HashPrimitive::Poseidon, dialect).unwrap()
            })
            .collect();
        assert_ne!(hashes[0], hashes[1]);
        assert_ne!(hashes[1], hashes[2]);
        assert_ne!(hashes[0], hashes[2]);
    }
}
