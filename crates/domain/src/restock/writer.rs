use std::time::Instant;

use inventory_store::{
    CancellationReason, CounterUpdate, EntityType, IndexKey, InventoryStore, Item, ItemKey,
    SKUS_PARTITION, TransactWrite, lots_partition,
};

use crate::error::InventoryError;

use super::RestockSkuCommand;

/// Position of the guarded ledger insert inside the restock transaction.
const LEDGER_OPERATION: usize = 0;

/// Result of submitting a restock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestockOutcome {
    /// The ledger entry was written and the aggregate incremented.
    Applied,
    /// The lot was already recorded; nothing changed.
    Duplicate,
}

impl RestockOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RestockOutcome::Applied => "applied",
            RestockOutcome::Duplicate => "duplicate",
        }
    }
}

/// Applies restock commands to the store with exactly-once effect.
///
/// Each restock is one transaction: an insert of the ledger entry guarded by
/// "no entry for this lot exists", plus an additive update of the SKU
/// aggregate. The guarded insert is the only idempotency gate, so redelivered
/// commands fail the guard and leave the aggregate untouched.
pub struct LedgerWriter<S: InventoryStore> {
    store: S,
}

impl<S: InventoryStore> LedgerWriter<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Builds the two-operation transaction for a command.
    pub fn transaction(command: &RestockSkuCommand) -> TransactWrite {
        let sku = command.sku().as_str();
        let lot_id = command.lot_id().as_str();
        let units = command.units().as_i64();
        let created_at = command.created_at().as_str();
        let updated_at = command.updated_at().as_str();

        let ledger = Item::new(ItemKey::ledger_entry(sku, lot_id), EntityType::LedgerEntry)
            .with_index(IndexKey::new(lots_partition(sku), created_at))
            .with_sku(sku)
            .with_units(units)
            .with_lot_id(lot_id)
            .with_created_at(created_at)
            .with_updated_at(updated_at);

        let aggregate = CounterUpdate {
            key: ItemKey::sku_aggregate(sku),
            entity_type: EntityType::SkuAggregate,
            index_partition: SKUS_PARTITION.to_string(),
            sku: sku.to_string(),
            delta: units,
            created_at: created_at.to_string(),
            updated_at: updated_at.to_string(),
        };

        TransactWrite::new()
            .put_if_absent(ledger)
            .add_to_counter(aggregate)
    }

    /// Records a restock.
    ///
    /// Returns [`RestockOutcome::Duplicate`] when the lot was already
    /// recorded. Any other store failure is [`InventoryError::Transient`] and
    /// the same command may be resubmitted.
    #[tracing::instrument(
        skip(self, command),
        fields(sku = %command.sku(), lot_id = %command.lot_id(), units = %command.units())
    )]
    pub async fn restock(
        &self,
        command: &RestockSkuCommand,
    ) -> Result<RestockOutcome, InventoryError> {
        let started = Instant::now();
        let result = self.store.transact_write(Self::transaction(command)).await;
        metrics::histogram!("inventory_store_transaction_seconds")
            .record(started.elapsed().as_secs_f64());

        match result {
            Ok(()) => {
                metrics::counter!("inventory_restock_applied_total").increment(1);
                tracing::info!("restock applied");
                Ok(RestockOutcome::Applied)
            }
            Err(err)
                if err.cancellation_reason(LEDGER_OPERATION)
                    == Some(CancellationReason::ConditionalCheckFailed) =>
            {
                // The stored entry is not compared with this command's units.
                metrics::counter!("inventory_restock_duplicates_total").increment(1);
                tracing::info!("lot already recorded, restock skipped");
                Ok(RestockOutcome::Duplicate)
            }
            Err(err) => {
                metrics::counter!("inventory_restock_failures_total").increment(1);
                tracing::warn!(error = %err, "restock failed");
                Err(InventoryError::Transient(err))
            }
        }
    }
}
