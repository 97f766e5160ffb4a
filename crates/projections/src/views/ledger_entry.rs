//! Ledger entry view: one accepted restock.

use inventory_store::{EntityType, Item, StoreError};
use serde::Serialize;

use super::expect_entity;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntryView {
    pub sku: String,
    pub units: i64,
    pub lot_id: String,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<Item> for LedgerEntryView {
    type Error = StoreError;

    fn try_from(item: Item) -> Result<Self, Self::Error> {
        expect_entity(&item, EntityType::LedgerEntry)?;

        Ok(Self {
            sku: item.require("sku", &item.sku)?.clone(),
            units: *item.require("units", &item.units)?,
            lot_id: item.require("lotId", &item.lot_id)?.clone(),
            created_at: item.require("createdAt", &item.created_at)?.clone(),
            updated_at: item.require("updatedAt", &item.updated_at)?.clone(),
        })
    }
}
