//! SKU aggregate view: running stock total per SKU.

use inventory_store::{EntityType, Item, StoreError};
use serde::Serialize;

use super::expect_entity;

/// Total units restocked for one SKU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkuAggregateView {
    pub sku: String,
    pub units: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<Item> for SkuAggregateView {
    type Error = StoreError;

    fn try_from(item: Item) -> Result<Self, Self::Error> {
        expect_entity(&item, EntityType::SkuAggregate)?;

        Ok(Self {
            sku: item.require("sku", &item.sku)?.clone(),
            units: *item.require("units", &item.units)?,
            created_at: item.require("createdAt", &item.created_at)?.clone(),
            updated_at: item.require("updatedAt", &item.updated_at)?.clone(),
        })
    }
}
