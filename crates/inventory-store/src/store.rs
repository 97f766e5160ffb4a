use async_trait::async_trait;

use crate::{Item, ItemKey, ItemQuery, QueryOutput, Result, TransactWrite};

/// Core trait for single-table item stores.
///
/// All implementations must be thread-safe (Send + Sync) and provide strong
/// read-after-write consistency for key lookups and conditional writes.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Applies every operation atomically: either all are committed or none.
    ///
    /// When a guard condition fails the whole transaction is rejected with
    /// [`crate::StoreError::TransactionCanceled`], carrying one reason per
    /// operation in request order.
    async fn transact_write(&self, transaction: TransactWrite) -> Result<()>;

    /// Fetches a single item by primary key.
    async fn get_item(&self, key: &ItemKey) -> Result<Option<Item>>;

    /// Runs a partition query.
    async fn query(&self, query: ItemQuery) -> Result<QueryOutput>;
}
