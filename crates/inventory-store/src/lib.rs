//! Single-table item store for the inventory ledger.
//!
//! Ledger entries and SKU aggregates share one keyspace, told apart by key
//! prefixes and an entity type tag. Writers submit all-or-nothing
//! [`TransactWrite`] batches whose guarded inserts give exactly-once effects.

pub mod error;
pub mod item;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod store;
pub mod transaction;

pub use error::{Result, StoreError};
pub use item::{
    EntityType, IndexKey, Item, ItemKey, LOT_PREFIX, LOTS_PREFIX, SKU_PREFIX, SKUS_PARTITION,
    lots_partition, sku_partition,
};
pub use memory::InMemoryInventoryStore;
pub use postgres::PostgresInventoryStore;
pub use query::{Direction, ItemQuery, QueryOutput, QueryTarget};
pub use store::InventoryStore;
pub use transaction::{
    CancellationReason, CounterUpdate, MAX_TRANSACTION_OPERATIONS, TransactWrite, WriteOperation,
};
