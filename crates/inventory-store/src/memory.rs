use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    CancellationReason, InventoryStore, Item, ItemKey, ItemQuery, QueryOutput, QueryTarget, Result,
    StoreError, TransactWrite, WriteOperation,
};

/// In-memory item store implementation for testing and local runs.
///
/// Provides the same transactional guarantees as the PostgreSQL
/// implementation: every guard condition is checked under one write lock
/// before any operation is applied.
#[derive(Clone, Default)]
pub struct InMemoryInventoryStore {
    items: Arc<RwLock<BTreeMap<ItemKey, Item>>>,
    calls: Arc<AtomicUsize>,
    unavailable: Arc<AtomicBool>,
    conflicting: Arc<AtomicBool>,
    absent_results: Arc<AtomicBool>,
}

impl InMemoryInventoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of store calls made so far, successful or not.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of items stored.
    pub async fn item_count(&self) -> usize {
        self.items.read().await.len()
    }

    /// Makes every call fail with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Makes transactions fail as if a concurrent transaction touched the
    /// last operation's item.
    pub fn set_conflicting(&self, conflicting: bool) {
        self.conflicting.store(conflicting, Ordering::SeqCst);
    }

    /// Makes queries return no collection at all instead of an empty one.
    pub fn set_absent_results(&self, absent: bool) {
        self.absent_results.store(absent, Ordering::SeqCst);
    }

    fn begin_call(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "in-memory store marked unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl InventoryStore for InMemoryInventoryStore {
    async fn transact_write(&self, transaction: TransactWrite) -> Result<()> {
        self.begin_call()?;
        transaction.validate()?;

        let mut items = self.items.write().await;

        if self.conflicting.load(Ordering::SeqCst) {
            let mut reasons = vec![CancellationReason::None; transaction.len()];
            if let Some(last) = reasons.last_mut() {
                *last = CancellationReason::TransactionConflict;
            }
            return Err(StoreError::TransactionCanceled { reasons });
        }

        // Check every condition before touching anything.
        let reasons: Vec<CancellationReason> = transaction
            .operations()
            .iter()
            .map(|operation| match operation {
                WriteOperation::PutIfAbsent(item) if items.contains_key(&item.key) => {
                    CancellationReason::ConditionalCheckFailed
                }
                _ => CancellationReason::None,
            })
            .collect();

        if reasons.iter().any(|r| *r != CancellationReason::None) {
            return Err(StoreError::TransactionCanceled { reasons });
        }

        for operation in transaction.into_operations() {
            match operation {
                WriteOperation::PutIfAbsent(item) => {
                    items.insert(item.key.clone(), item);
                }
                WriteOperation::AddToCounter(update) => {
                    let next = update.apply_to(items.get(&update.key));
                    items.insert(update.key, next);
                }
            }
        }

        Ok(())
    }

    async fn get_item(&self, key: &ItemKey) -> Result<Option<Item>> {
        self.begin_call()?;
        Ok(self.items.read().await.get(key).cloned())
    }

    async fn query(&self, query: ItemQuery) -> Result<QueryOutput> {
        self.begin_call()?;
        if self.absent_results.load(Ordering::SeqCst) {
            return Ok(QueryOutput::absent());
        }

        let items = self.items.read().await;
        let mut matched: Vec<Item> = match &query.target {
            QueryTarget::Table { pk, sk_begins_with } => items
                .values()
                .filter(|item| &item.key.pk == pk)
                .filter(|item| {
                    sk_begins_with
                        .as_deref()
                        .is_none_or(|prefix| item.key.sk.starts_with(prefix))
                })
                .cloned()
                .collect(),
            QueryTarget::Index { gsi1pk } => {
                let mut matched: Vec<Item> = items
                    .values()
                    .filter(|item| {
                        item.index
                            .as_ref()
                            .is_some_and(|index| &index.gsi1pk == gsi1pk)
                    })
                    .cloned()
                    .collect();
                // Ties on the secondary sort value fall back to the primary key.
                matched.sort_by(|a, b| {
                    let a_sk = a.index.as_ref().map(|i| i.gsi1sk.as_str());
                    let b_sk = b.index.as_ref().map(|i| i.gsi1sk.as_str());
                    a_sk.cmp(&b_sk).then_with(|| a.key.cmp(&b.key))
                });
                matched
            }
        };

        if !query.direction.is_forward() {
            matched.reverse();
        }
        if let Some(limit) = query.limit {
            matched.truncate(limit);
        }

        Ok(QueryOutput::new(matched))
    }
}
