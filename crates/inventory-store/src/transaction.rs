use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{EntityType, IndexKey, Item, ItemKey, Result, StoreError};

/// Largest number of operations a single transaction may carry.
pub const MAX_TRANSACTION_OPERATIONS: usize = 100;

/// Why an individual operation caused a transaction to be canceled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CancellationReason {
    /// The operation was not the cause.
    None,
    /// The operation's guard condition did not hold.
    ConditionalCheckFailed,
    /// A concurrent transaction touched the same item.
    TransactionConflict,
}

/// One write inside a [`TransactWrite`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOperation {
    /// Insert an item, guarded by "no item with this key exists".
    PutIfAbsent(Item),
    /// Add to a numeric counter, creating the item if needed.
    AddToCounter(CounterUpdate),
}

impl WriteOperation {
    pub fn key(&self) -> &ItemKey {
        match self {
            WriteOperation::PutIfAbsent(item) => &item.key,
            WriteOperation::AddToCounter(update) => &update.key,
        }
    }
}

/// Additive upsert of a counter item.
///
/// `units` grows by `delta` starting from zero when absent. `created_at` and
/// the secondary sort value are set only when missing; `updated_at` is
/// always overwritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterUpdate {
    pub key: ItemKey,
    pub entity_type: EntityType,
    pub index_partition: String,
    pub sku: String,
    pub delta: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl CounterUpdate {
    /// Computes the item that results from applying this update to the
    /// current one.
    pub fn apply_to(&self, current: Option<&Item>) -> Item {
        let mut item = current
            .cloned()
            .unwrap_or_else(|| Item::new(self.key.clone(), self.entity_type));

        item.units = Some(item.units.unwrap_or(0) + self.delta);
        if item.sku.is_none() {
            item.sku = Some(self.sku.clone());
        }
        let created_at = item
            .created_at
            .get_or_insert_with(|| self.created_at.clone())
            .clone();
        if item.index.is_none() {
            item.index = Some(IndexKey::new(self.index_partition.clone(), created_at));
        }
        item.updated_at = Some(self.updated_at.clone());
        item
    }
}

/// An all-or-nothing batch of writes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactWrite {
    operations: Vec<WriteOperation>,
}

impl TransactWrite {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an insert-if-absent operation.
    pub fn put_if_absent(mut self, item: Item) -> Self {
        self.operations.push(WriteOperation::PutIfAbsent(item));
        self
    }

    /// Appends an additive counter update.
    pub fn add_to_counter(mut self, update: CounterUpdate) -> Self {
        self.operations.push(WriteOperation::AddToCounter(update));
        self
    }

    pub fn operations(&self) -> &[WriteOperation] {
        &self.operations
    }

    pub fn into_operations(self) -> Vec<WriteOperation> {
        self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Checks the request before it is submitted: at least one operation,
    /// no more than [`MAX_TRANSACTION_OPERATIONS`], and no key written twice.
    pub fn validate(&self) -> Result<()> {
        if self.operations.is_empty() {
            return Err(StoreError::InvalidTransaction(
                "transaction has no operations".to_string(),
            ));
        }
        if self.operations.len() > MAX_TRANSACTION_OPERATIONS {
            return Err(StoreError::InvalidTransaction(format!(
                "transaction has {} operations, limit is {MAX_TRANSACTION_OPERATIONS}",
                self.operations.len()
            )));
        }

        let mut seen = HashSet::with_capacity(self.operations.len());
        for operation in &self.operations {
            if !seen.insert(operation.key()) {
                return Err(StoreError::InvalidTransaction(format!(
                    "key {} is written more than once",
                    operation.key()
                )));
            }
        }

        Ok(())
    }
}
