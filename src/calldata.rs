//! Felt serialization of orders for marketplace contract calls
//!
//! Follows the ABI `OrderParameters` shape, which is richer than the hashed
//! struct: it carries `zone`, `zone_hash`, `start_time` and
//! `total_original_consideration_items`. `u256` values are serialized as
//! `low, high`.

use starknet_crypto::Felt;

use crate::snip12::{WideUint, ORDER_CONDUIT_KEY, ORDER_TYPE_FULL_OPEN};
use crate::types::{ConsiderationItem, OfferItem, OrderParameters, SignedOrder};

/// Minimal orders carry no zone
pub const ZONE_NONE: Felt = Felt::ZERO;

/// Minimal orders carry no zone hash
pub const ZONE_HASH_NONE: Felt = Felt::ZERO;

/// One consideration slot per order
pub const TOTAL_ORIGINAL_CONSIDERATION_ITEMS: u64 = 1;

fn push_wide(calldata: &mut Vec<Felt>, value: &WideUint) {
    calldata.push(value.low_felt());
    calldata.push(value.high_felt());
}

fn push_offer_item(calldata: &mut Vec<Felt>, item: &OfferItem) {
    calldata.push(item.item_type.to_felt());
    calldata.push(item.token);
    push_wide(calldata, &item.identifier_or_criteria);
    push_wide(calldata, &item.start_amount);
    push_wide(calldata, &item.end_amount);
}

fn push_consideration_item(calldata: &mut Vec<Felt>, item: &ConsiderationItem) {
    calldata.push(item.item_type.to_felt());
    calldata.push(item.token);
    push_wide(calldata, &item.identifier_or_criteria);
    push_wide(calldata, &item.start_amount);
    push_wide(calldata, &item.end_amount);
    calldata.push(item.recipient);
}

/// ABI `OrderParameters` in field order
pub fn order_parameters_calldata(order: &OrderParameters) -> Vec<Felt> {
    let mut calldata = Vec::with_capacity(28);
    calldata.push(order.offerer);
    calldata.push(ZONE_NONE);
    push_offer_item(&mut calldata, &order.offer);
    push_consideration_item(&mut calldata, &order.consideration);
    calldata.push(ORDER_TYPE_FULL_OPEN);
    calldata.push(Felt::from(order.start_time));
    calldata.push(Felt::from(order.end_time));
    calldata.push(ZONE_HASH_NONE);
    calldata.push(order.salt);
    calldata.push(ORDER_CONDUIT_KEY);
    calldata.push(Felt::from(TOTAL_ORIGINAL_CONSIDERATION_ITEMS));
    calldata.push(order.nonce);
    calldata
}

/// `register_order(order: Order)`: parameters then the signature array
pub fn register_order_calldata(order: &SignedOrder) -> Vec<Felt> {
    let mut calldata = order_parameters_calldata(&order.parameters);
    let signature = order.signature.to_felts();
    calldata.push(Felt::from(signature.len() as u64));
    calldata.extend(signature);
    calldata
}

/// `cancel_order(parameters: OrderParameters)`
pub fn cancel_order_calldata(order: &OrderParameters) -> Vec<Felt> {
    order_parameters_calldata(order)
}

/// `fulfill_order(order_hash, fulfiller)`
pub fn fulfill_order_calldata(order_hash: Felt, fulfiller: Felt) -> Vec<Felt> {
    vec![order_hash, fulfiller]
}
