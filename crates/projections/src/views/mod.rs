//! Read views over stored items.

pub mod ledger_entry;
pub mod sku_aggregate;

pub use ledger_entry::LedgerEntryView;
pub use sku_aggregate::SkuAggregateView;

use inventory_store::{EntityType, Item, StoreError};

/// Rejects items of the wrong kind.
fn expect_entity(item: &Item, expected: EntityType) -> Result<(), StoreError> {
    if item.entity_type == expected {
        Ok(())
    } else {
        Err(StoreError::MalformedItem {
            key: item.key.to_string(),
            message: format!("expected {expected}, found {}", item.entity_type),
        })
    }
}
