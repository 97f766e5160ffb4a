//! Domain layer for the inventory ledger.
//!
//! This crate provides:
//! - the restock event and its validation
//! - decoding of upstream change records into events
//! - the restock command and the idempotent ledger writer
//! - the restock service used by the ingestion and HTTP entry points

pub mod change_feed;
pub mod error;
pub mod events;
pub mod restock;

pub use change_feed::{AttributeValue, ChangeRecord, normalize, normalize_str};
pub use error::{ErrorKind, InventoryError};
pub use events::{SKU_RESTOCKED_EVENT, SkuRestocked, SkuRestockedData};
pub use restock::{
    CommandOptions, LedgerWriter, RestockOutcome, RestockService, RestockSkuCommand,
    RestockSkuData,
};
