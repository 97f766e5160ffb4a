//! Query side of the inventory ledger.

use common::{Sku, ValidationError, ValidationReason};
use inventory_store::{
    Direction, InventoryStore, Item, ItemQuery, SKU_PREFIX, SKUS_PARTITION, StoreError,
    lots_partition, sku_partition,
};

use crate::error::{QueryError, Result};
use crate::views::{LedgerEntryView, SkuAggregateView};

/// Page size used when the caller does not ask for one.
pub const DEFAULT_LIST_LIMIT: usize = 50;

/// Largest page size a caller may ask for.
pub const MAX_LIST_LIMIT: usize = 100;

/// Ordering and page size for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListParams {
    pub direction: Direction,
    pub limit: usize,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            direction: Direction::Asc,
            limit: DEFAULT_LIST_LIMIT,
        }
    }
}

impl ListParams {
    /// Validates raw query parameters. Absent values take the defaults.
    ///
    /// `direction` is `asc` or `desc` in any case; `limit` must lie in
    /// `1..=MAX_LIST_LIMIT`.
    pub fn parse(
        direction: Option<&str>,
        limit: Option<i64>,
    ) -> std::result::Result<Self, ValidationError> {
        let direction = match direction {
            None => Direction::default(),
            Some(raw) => raw.trim().parse().map_err(|_| {
                ValidationError::new(
                    "direction",
                    ValidationReason::UnexpectedValue {
                        expected: "asc or desc",
                    },
                )
            })?,
        };

        let limit = match limit {
            None => DEFAULT_LIST_LIMIT,
            Some(raw) if raw < 1 => {
                return Err(ValidationError::new(
                    "limit",
                    ValidationReason::BelowMinimum { min: 1 },
                ));
            }
            Some(raw) if raw > MAX_LIST_LIMIT as i64 => {
                return Err(ValidationError::new(
                    "limit",
                    ValidationReason::AboveMaximum {
                        max: MAX_LIST_LIMIT as i64,
                    },
                ));
            }
            Some(raw) => raw as usize,
        };

        Ok(Self { direction, limit })
    }

    pub fn descending(mut self) -> Self {
        self.direction = Direction::Desc;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.clamp(1, MAX_LIST_LIMIT);
        self
    }
}

/// Reads SKU aggregates and ledger entries. Never writes.
pub struct InventoryReader<S: InventoryStore> {
    store: S,
}

impl<S: InventoryStore> InventoryReader<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the aggregate for one SKU: an empty list when the SKU was
    /// never restocked, otherwise a single entry.
    #[tracing::instrument(skip(self))]
    pub async fn list_by_sku(&self, sku: &Sku) -> Result<Vec<SkuAggregateView>> {
        let query = ItemQuery::table(sku_partition(sku.as_str())).sort_key_prefix(SKU_PREFIX);
        self.run("list_by_sku", query).await
    }

    /// Lists SKU aggregates in creation order.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self, params: ListParams) -> Result<Vec<SkuAggregateView>> {
        let query = ItemQuery::index(SKUS_PARTITION)
            .direction(params.direction)
            .limit(params.limit);
        self.run("list", query).await
    }

    /// Lists a SKU's ledger entries in the order they were recorded.
    #[tracing::instrument(skip(self))]
    pub async fn list_lots(&self, sku: &Sku, params: ListParams) -> Result<Vec<LedgerEntryView>> {
        let query = ItemQuery::index(lots_partition(sku.as_str()))
            .direction(params.direction)
            .limit(params.limit);
        self.run("list_lots", query).await
    }

    async fn run<V>(&self, name: &'static str, query: ItemQuery) -> Result<Vec<V>>
    where
        V: TryFrom<Item, Error = StoreError>,
    {
        metrics::counter!("inventory_queries_total", "query" => name).increment(1);

        let output = self.store.query(query).await.map_err(|err| {
            tracing::error!(query = name, error = %err, "inventory query failed");
            QueryError::Transient(err)
        })?;

        output
            .into_items()
            .into_iter()
            .map(V::try_from)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|err| {
                tracing::error!(query = name, error = %err, "malformed item in query result");
                QueryError::Transient(err)
            })
    }
}
