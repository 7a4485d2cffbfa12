//! Type-string registry
//!
//! Canonical struct definitions for each struct-type dialect. The encoded type
//! of a struct is its own `Name(field:type,...)` followed by every referenced
//! struct, once each, sorted by name.

use std::collections::{BTreeMap, BTreeSet};

use starknet_crypto::Felt;

use super::dialect::{AddressTyping, AmountEncoding, StructDialect};
use super::primitive::selector_for;
use crate::error::{MarketplaceError, Result};

pub const OFFER_ITEM: &str = "OfferItem";
pub const CONSIDERATION_ITEM: &str = "ConsiderationItem";
pub const ORDER_PARAMETERS: &str = "OrderParameters";
pub const U256: &str = "u256";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Felt,
    ContractAddress,
    U256,
    Struct(&'static str),
}

impl FieldKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Felt => "felt",
            FieldKind::ContractAddress => "ContractAddress",
            FieldKind::U256 => U256,
            FieldKind::Struct(name) => *name,
        }
    }

    fn referenced_struct(&self) -> Option<&'static str> {
        match self {
            FieldKind::U256 => Some(U256),
            FieldKind::Struct(name) => Some(*name),
            FieldKind::Felt | FieldKind::ContractAddress => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDef {
    pub name: &'static str,
    pub fields: Vec<(&'static str, FieldKind)>,
}

impl StructDef {
    fn new(name: &'static str, fields: Vec<(&'static str, FieldKind)>) -> Self {
        Self { name, fields }
    }

    /// `Name(field:type,...)` without referenced structs
    pub fn encode(&self) -> String {
        let fields: Vec<String> = self
            .fields
            .iter()
            .map(|(name, kind)| format!("{}:{}", name, kind.type_name()))
            .collect();
        format!("{}({})", self.name, fields.join(","))
    }
}

/// Struct definitions of one struct-type dialect
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    defs: BTreeMap<&'static str, StructDef>,
}

impl TypeRegistry {
    pub fn for_structs(dialect: StructDialect) -> Self {
        let address = match dialect.addresses {
            AddressTyping::Felt => FieldKind::Felt,
            AddressTyping::ContractAddress => FieldKind::ContractAddress,
        };
        let amount = match dialect.amounts {
            AmountEncoding::Felt => FieldKind::Felt,
            AmountEncoding::U256(_) => FieldKind::U256,
        };

        let item_fields = vec![
            ("item_type", FieldKind::Felt),
            ("token", address),
            ("identifier_or_criteria", amount),
            ("start_amount", amount),
            ("end_amount", amount),
        ];
        let mut consideration_fields = item_fields.clone();
        consideration_fields.push(("recipient", address));

        let mut defs = BTreeMap::new();
        defs.insert(OFFER_ITEM, StructDef::new(OFFER_ITEM, item_fields));
        defs.insert(
            CONSIDERATION_ITEM,
            StructDef::new(CONSIDERATION_ITEM, consideration_fields),
        );
        defs.insert(
            ORDER_PARAMETERS,
            StructDef::new(
                ORDER_PARAMETERS,
                vec![
                    ("offerer", address),
                    ("offer", FieldKind::Struct(OFFER_ITEM)),
                    ("consideration", FieldKind::Struct(CONSIDERATION_ITEM)),
                    ("order_type", FieldKind::Felt),
                    ("end_time", FieldKind::Felt),
                    ("salt", FieldKind::Felt),
                    ("conduit_key", FieldKind::Felt),
                ],
            ),
        );
        if amount == FieldKind::U256 {
            defs.insert(
                U256,
                StructDef::new(U256, vec![("low", FieldKind::Felt), ("high", FieldKind::Felt)]),
            );
        }

        Self { defs }
    }

    pub fn get(&self, name: &str) -> Option<&StructDef> {
        self.defs.get(name)
    }

    pub fn defs(&self) -> impl Iterator<Item = &StructDef> {
        self.defs.values()
    }

    /// Full type string: primary struct then sorted dependencies
    pub fn encode_type(&self, name: &str) -> Result<String> {
        let primary = self
            .get(name)
            .ok_or_else(|| MarketplaceError::UnknownType(name.to_string()))?;

        let mut dependencies = BTreeSet::new();
        self.collect_dependencies(primary, &mut dependencies)?;
        dependencies.remove(primary.name);

        let mut encoded = primary.encode();
        for dependency in dependencies {
            // collect_dependencies only inserts registered names
            if let Some(def) = self.get(dependency) {
                encoded.push_str(&def.encode());
            }
        }
        Ok(encoded)
    }

    pub fn selector(&self, name: &str) -> Result<Felt> {
        Ok(selector_for(&self.encode_type(name)?))
    }

    fn collect_dependencies(
        &self,
        def: &StructDef,
        seen: &mut BTreeSet<&'static str>,
    ) -> Result<()> {
        for (_, kind) in &def.fields {
            let Some(referenced) = kind.referenced_struct() else {
                continue;
            };
            let referenced_def = self
                .get(referenced)
                .ok_or_else(|| MarketplaceError::UnknownType(referenced.to_string()))?;
            if seen.insert(referenced) {
                self.collect_dependencies(referenced_def, seen)?;
            }
        }
        Ok(())
    }
}
