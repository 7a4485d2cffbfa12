//! Diagnostic typed-data view of an order
//!
//! The JSON layout is derived from the same type registry and domain encoding
//! used to compute the order hash. It is for inspection only: a SNIP-12
//! wallet hashing it binds the signer account into the message and applies
//! its own type-string rules, so its message hash is not `order_hash`.
//! Signers must sign `TypedOrderPayload::order_hash` directly.

use serde_json::{json, Map, Value};
use starknet_crypto::Felt;

use crate::error::Result;
use crate::snip12::{
    domain_type_string, felt_to_hex, item_type_element, order_hash, AmountEncoding, DialectConfig,
    DomainRevision, DomainValue, TypeRegistry, WideUint, CONSIDERATION_SLOT_LITERAL,
    OFFER_SLOT_LITERAL, ORDER_CONDUIT_KEY, ORDER_TYPE_FULL_OPEN,
};
use crate::types::{ConsiderationItem, OfferItem, OrderParameters};

const PRIMARY_TYPE: &str = "OrderParameters";

/// Order plus the dialect and hash it was checked under
///
/// `order_hash` is the value to sign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedOrderPayload {
    pub dialect: DialectConfig,
    pub parameters: OrderParameters,
    pub order_hash: Felt,
}

impl TypedOrderPayload {
    pub fn new(dialect: DialectConfig, parameters: OrderParameters) -> Result<Self> {
        let order_hash = order_hash(&dialect, &parameters)?;
        Ok(Self {
            dialect,
            parameters,
            order_hash,
        })
    }

    /// `{ types, primaryType, domain, message }`, for display and debugging
    pub fn typed_data(&self) -> Result<Value> {
        Ok(json!({
            "types": self.types(),
            "primaryType": PRIMARY_TYPE,
            "domain": self.domain(),
            "message": self.message()?,
        }))
    }

    fn types(&self) -> Value {
        let registry = TypeRegistry::for_structs(self.dialect.structs);
        let mut types = Map::new();

        let revision_present = self.dialect.domain.revision.is_present();
        let domain_type = domain_type_string(revision_present);
        let domain_name = domain_type.split('(').next().unwrap_or(domain_type);
        let field_type = if revision_present { "shortstring" } else { "felt" };
        let mut domain_fields = vec![
            json!({ "name": "name", "type": field_type }),
            json!({ "name": "version", "type": field_type }),
            json!({ "name": "chainId", "type": field_type }),
        ];
        if revision_present {
            domain_fields.push(json!({ "name": "revision", "type": field_type }));
        }
        types.insert(domain_name.to_string(), Value::Array(domain_fields));

        for def in registry.defs() {
            let fields = def
                .fields
                .iter()
                .map(|(name, kind)| json!({ "name": name, "type": kind.type_name() }))
                .collect();
            types.insert(def.name.to_string(), Value::Array(fields));
        }

        Value::Object(types)
    }

    fn domain(&self) -> Value {
        let domain = &self.dialect.domain;
        let mut value = json!({
            "name": domain_value_json(&domain.name),
            "version": domain_value_json(&domain.version),
            "chainId": domain_value_json(&domain.chain_id),
        });
        let revision = match domain.revision {
            DomainRevision::FeltOne => Some(json!(1)),
            DomainRevision::ShortStringOne => Some(json!("1")),
            DomainRevision::Absent => None,
        };
        if let (Some(revision), Some(object)) = (revision, value.as_object_mut()) {
            object.insert("revision".to_string(), revision);
        }
        value
    }

    fn message(&self) -> Result<Value> {
        let order = &self.parameters;
        Ok(json!({
            "offerer": felt_to_hex(&order.offerer),
            "offer": self.offer_json(&order.offer)?,
            "consideration": self.consideration_json(&order.consideration)?,
            "order_type": felt_to_hex(&ORDER_TYPE_FULL_OPEN),
            "end_time": felt_to_hex(&Felt::from(order.end_time)),
            "salt": felt_to_hex(&order.salt),
            "conduit_key": felt_to_hex(&ORDER_CONDUIT_KEY),
        }))
    }

    fn offer_json(&self, item: &OfferItem) -> Result<Value> {
        let item_type = item_type_element(
            item.item_type,
            OFFER_SLOT_LITERAL,
            self.dialect.structs.item_types,
        )?;
        Ok(json!({
            "item_type": felt_to_hex(&item_type),
            "token": felt_to_hex(&item.token),
            "identifier_or_criteria": self.amount_json(&item.identifier_or_criteria)?,
            "start_amount": self.amount_json(&item.start_amount)?,
            "end_amount": self.amount_json(&item.end_amount)?,
        }))
    }

    fn consideration_json(&self, item: &ConsiderationItem) -> Result<Value> {
        let item_type = item_type_element(
            item.item_type,
            CONSIDERATION_SLOT_LITERAL,
            self.dialect.structs.item_types,
        )?;
        Ok(json!({
            "item_type": felt_to_hex(&item_type),
            "token": felt_to_hex(&item.token),
            "identifier_or_criteria": self.amount_json(&item.identifier_or_criteria)?,
            "start_amount": self.amount_json(&item.start_amount)?,
            "end_amount": self.amount_json(&item.end_amount)?,
            "recipient": felt_to_hex(&item.recipient),
        }))
    }

    fn amount_json(&self, value: &WideUint) -> Result<Value> {
        match self.dialect.structs.amounts {
            AmountEncoding::Felt => Ok(json!(felt_to_hex(&value.to_felt()?))),
            AmountEncoding::U256(_) => Ok(json!({
                "low": felt_to_hex(&value.low_felt()),
                "high": felt_to_hex(&value.high_felt()),
            })),
        }
    }
}

fn domain_value_json(value: &DomainValue) -> Value {
    match value {
        DomainValue::Text(s) => json!(s),
        DomainValue::Numeric(n) => json!(felt_to_hex(&Felt::from(*n))),
    }
}
