use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};

use crate::{
    CancellationReason, CounterUpdate, EntityType, IndexKey, InventoryStore, Item, ItemKey,
    ItemQuery, QueryOutput, QueryTarget, Result, StoreError, TransactWrite, WriteOperation,
};

const PRIMARY_KEY_CONSTRAINT: &str = "inventory_items_pkey";

/// SQLSTATE codes for serialization failures and detected deadlocks.
const CONFLICT_CODES: [&str; 2] = ["40001", "40P01"];

const ITEM_COLUMNS: &str =
    "pk, sk, entity_type, gsi1pk, gsi1sk, sku, units, lot_id, created_at, updated_at";

/// PostgreSQL-backed item store.
///
/// Every item lives in the single `inventory_items` table keyed by
/// `(pk, sk)`. The secondary ordering key is served by an index over
/// `(gsi1pk, gsi1sk)`.
#[derive(Clone)]
pub struct PostgresInventoryStore {
    pool: PgPool,
}

impl PostgresInventoryStore {
    /// Creates a new PostgreSQL item store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_item(row: PgRow) -> Result<Item> {
        let pk: String = row.try_get("pk")?;
        let sk: String = row.try_get("sk")?;
        let key = ItemKey::new(pk, sk);

        let entity_type: String = row.try_get("entity_type")?;
        let entity_type = entity_type
            .parse::<EntityType>()
            .map_err(|message| StoreError::MalformedItem {
                key: key.to_string(),
                message,
            })?;

        let gsi1pk: Option<String> = row.try_get("gsi1pk")?;
        let gsi1sk: Option<String> = row.try_get("gsi1sk")?;
        let index = match (gsi1pk, gsi1sk) {
            (Some(gsi1pk), Some(gsi1sk)) => Some(IndexKey::new(gsi1pk, gsi1sk)),
            _ => None,
        };

        Ok(Item {
            key,
            entity_type,
            index,
            sku: row.try_get("sku")?,
            units: row.try_get("units")?,
            lot_id: row.try_get("lot_id")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    async fn put_if_absent(tx: &mut Transaction<'_, Postgres>, item: &Item) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO inventory_items (pk, sk, entity_type, gsi1pk, gsi1sk, sku, units, lot_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(&item.key.pk)
        .bind(&item.key.sk)
        .bind(item.entity_type.as_str())
        .bind(item.index.as_ref().map(|i| i.gsi1pk.as_str()))
        .bind(item.index.as_ref().map(|i| i.gsi1sk.as_str()))
        .bind(item.sku.as_deref())
        .bind(item.units)
        .bind(item.lot_id.as_deref())
        .bind(item.created_at.as_deref())
        .bind(item.updated_at.as_deref())
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    async fn add_to_counter(
        tx: &mut Transaction<'_, Postgres>,
        update: &CounterUpdate,
    ) -> sqlx::Result<()> {
        // The row lock taken by ON CONFLICT serializes concurrent increments.
        sqlx::query(
            r#"
            INSERT INTO inventory_items (pk, sk, entity_type, gsi1pk, gsi1sk, sku, units, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $5, $8)
            ON CONFLICT (pk, sk) DO UPDATE SET
                units = COALESCE(inventory_items.units, 0) + EXCLUDED.units,
                sku = COALESCE(inventory_items.sku, EXCLUDED.sku),
                created_at = COALESCE(inventory_items.created_at, EXCLUDED.created_at),
                gsi1pk = COALESCE(inventory_items.gsi1pk, EXCLUDED.gsi1pk),
                gsi1sk = COALESCE(inventory_items.gsi1sk, inventory_items.created_at, EXCLUDED.gsi1sk),
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(&update.key.pk)
        .bind(&update.key.sk)
        .bind(update.entity_type.as_str())
        .bind(&update.index_partition)
        .bind(&update.created_at)
        .bind(&update.sku)
        .bind(update.delta)
        .bind(&update.updated_at)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Maps a failure of the operation at `index` to the store error the
    /// caller sees.
    fn classify(error: sqlx::Error, index: usize, len: usize) -> StoreError {
        let reason = match &error {
            sqlx::Error::Database(db_err) if db_err.constraint() == Some(PRIMARY_KEY_CONSTRAINT) => {
                Some(CancellationReason::ConditionalCheckFailed)
            }
            sqlx::Error::Database(db_err)
                if db_err
                    .code()
                    .is_some_and(|code| CONFLICT_CODES.contains(&&*code)) =>
            {
                Some(CancellationReason::TransactionConflict)
            }
            _ => None,
        };

        match reason {
            Some(reason) => {
                let mut reasons = vec![CancellationReason::None; len];
                reasons[index] = reason;
                tracing::debug!(index, ?reason, "transaction canceled");
                StoreError::TransactionCanceled { reasons }
            }
            None => StoreError::Database(error),
        }
    }
}

#[async_trait]
impl InventoryStore for PostgresInventoryStore {
    async fn transact_write(&self, transaction: TransactWrite) -> Result<()> {
        transaction.validate()?;

        let len = transaction.len();
        let mut tx = self.pool.begin().await?;

        // Dropping `tx` on an early return rolls everything back.
        for (index, operation) in transaction.operations().iter().enumerate() {
            let result = match operation {
                WriteOperation::PutIfAbsent(item) => Self::put_if_absent(&mut tx, item).await,
                WriteOperation::AddToCounter(update) => Self::add_to_counter(&mut tx, update).await,
            };
            result.map_err(|e| Self::classify(e, index, len))?;
        }

        tx.commit().await.map_err(|e| Self::classify(e, len - 1, len))?;
        Ok(())
    }

    async fn get_item(&self, key: &ItemKey) -> Result<Option<Item>> {
        let row: Option<PgRow> = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM inventory_items WHERE pk = $1 AND sk = $2"
        ))
        .bind(&key.pk)
        .bind(&key.sk)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_item).transpose()
    }

    async fn query(&self, query: ItemQuery) -> Result<QueryOutput> {
        let order = if query.direction.is_forward() {
            "ASC"
        } else {
            "DESC"
        };

        let mut sql = format!("SELECT {ITEM_COLUMNS} FROM inventory_items WHERE ");
        let mut param_count = 1;
        match &query.target {
            QueryTarget::Table { sk_begins_with, .. } => {
                sql.push_str("pk = $1");
                if sk_begins_with.is_some() {
                    param_count += 1;
                    sql.push_str(&format!(" AND starts_with(sk, ${param_count})"));
                }
                sql.push_str(&format!(" ORDER BY sk {order}"));
            }
            QueryTarget::Index { .. } => {
                sql.push_str("gsi1pk = $1 AND gsi1sk IS NOT NULL");
                sql.push_str(&format!(
                    " ORDER BY gsi1sk {order}, pk {order}, sk {order}"
                ));
            }
        }
        if query.limit.is_some() {
            param_count += 1;
            sql.push_str(&format!(" LIMIT ${param_count}"));
        }

        let mut sqlx_query = sqlx::query(&sql);
        match query.target {
            QueryTarget::Table { pk, sk_begins_with } => {
                sqlx_query = sqlx_query.bind(pk);
                if let Some(prefix) = sk_begins_with {
                    sqlx_query = sqlx_query.bind(prefix);
                }
            }
            QueryTarget::Index { gsi1pk } => {
                sqlx_query = sqlx_query.bind(gsi1pk);
            }
        }
        if let Some(limit) = query.limit {
            sqlx_query = sqlx_query.bind(limit as i64);
        }

        let rows = sqlx_query.fetch_all(&self.pool).await?;
        let items = rows
            .into_iter()
            .map(Self::row_to_item)
            .collect::<Result<Vec<_>>>()?;

        Ok(QueryOutput::new(items))
    }
}
