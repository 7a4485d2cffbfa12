//! Final order hash: prefix, domain separator, zero context and struct hash

use starknet_crypto::Felt;

use super::dialect::{DialectConfig, MessagePrefix};
use super::domain::domain_hash;
use super::primitive::HashPrimitive;
use super::struct_hash::{consideration_item_hash, offer_item_hash, StructHash};
use crate::error::Result;
use crate::types::OrderParameters;

/// Intermediate hashes of one order under one dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderHashBreakdown {
    pub domain_hash: Felt,
    pub offer_hash: Felt,
    pub consideration_hash: Felt,
    pub struct_hash: Felt,
    pub order_hash: Felt,
}

/// Hash the OrderParameters struct
pub fn order_struct_hash(dialect: &DialectConfig, order: &OrderParameters) -> Result<Felt> {
    order.struct_hash(dialect)
}

/// `hash([prefix, domain_hash, 0, struct_hash])`
///
/// The third element is the account/context slot, fixed to zero for orders.
pub fn combine_order_hash(
    prefix: MessagePrefix,
    primitive: HashPrimitive,
    domain_hash: Felt,
    struct_hash: Felt,
) -> Result<Felt> {
    Ok(primitive.hash(&[prefix.to_felt()?, domain_hash, Felt::ZERO, struct_hash]))
}

/// Compute the final message hash for an order
pub fn order_hash(dialect: &DialectConfig, order: &OrderParameters) -> Result<Felt> {
    let domain = domain_hash(dialect)?;
    let struct_hash = order_struct_hash(dialect, order)?;
    combine_order_hash(dialect.prefix, dialect.primitive, domain, struct_hash)
}

pub fn order_hash_breakdown(
    dialect: &DialectConfig,
    order: &OrderParameters,
) -> Result<OrderHashBreakdown> {
    let domain_hash = domain_hash(dialect)?;
    let offer_hash = offer_item_hash(&order.offer, dialect.primitive, dialect.structs)?;
    let consideration_hash =
        consideration_item_hash(&order.consideration, dialect.primitive, dialect.structs)?;
    let struct_hash = order_struct_hash(dialect, order)?;
    let order_hash = combine_order_hash(dialect.prefix, dialect.primitive, domain_hash, struct_hash)?;

    Ok(OrderHashBreakdown {
        domain_hash,
        offer_hash,
        consideration_hash,
        struct_hash,
        order_hash,
    })
}
