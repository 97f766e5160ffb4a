//! Read side of the inventory ledger.
//!
//! This crate provides the query side:
//! - [`InventoryReader`] for SKU aggregate and ledger entry queries
//! - [`ListParams`] for validated ordering and page size
//! - [`SkuAggregateView`] and [`LedgerEntryView`] read views

pub mod error;
pub mod reader;
pub mod views;

pub use error::{QueryError, Result};
pub use reader::{DEFAULT_LIST_LIMIT, InventoryReader, ListParams, MAX_LIST_LIMIT};
pub use views::{LedgerEntryView, SkuAggregateView};
