//! Restock service: the entry points that feed the ledger writer.

use common::{LotId, Sku, Units};
use inventory_store::InventoryStore;
use serde_json::Value;

use crate::change_feed;
use crate::error::InventoryError;

use super::{LedgerWriter, RestockOutcome, RestockSkuCommand};

/// Turns change records, raw event payloads and typed requests into restock
/// commands and hands them to the [`LedgerWriter`].
///
/// Validation failures are returned before any store call is made.
pub struct RestockService<S: InventoryStore> {
    writer: LedgerWriter<S>,
}

impl<S: InventoryStore> RestockService<S> {
    /// Creates a new restock service backed by the given store.
    pub fn new(store: S) -> Self {
        Self {
            writer: LedgerWriter::new(store),
        }
    }

    /// Handles one change record from the upstream event feed.
    #[tracing::instrument(skip(self, record))]
    pub async fn handle_change_record(
        &self,
        record: &Value,
    ) -> Result<RestockOutcome, InventoryError> {
        let event = change_feed::normalize(record).inspect_err(|err| {
            tracing::warn!(field = %err.field, reason = %err.reason, "rejected change record");
        })?;
        self.execute(&RestockSkuCommand::from_event(&event)).await
    }

    /// Handles a restock event payload delivered without the change-record
    /// envelope.
    #[tracing::instrument(skip(self, payload))]
    pub async fn handle_event_payload(
        &self,
        payload: &Value,
    ) -> Result<RestockOutcome, InventoryError> {
        let command = RestockSkuCommand::from_payload(payload).inspect_err(|err| {
            tracing::warn!(field = %err.field, reason = %err.reason, "rejected restock payload");
        })?;
        self.execute(&command).await
    }

    /// Records a restock from typed values.
    #[tracing::instrument(skip(self))]
    pub async fn restock(
        &self,
        sku: Sku,
        units: Units,
        lot_id: LotId,
    ) -> Result<RestockOutcome, InventoryError> {
        self.execute(&RestockSkuCommand::new(sku, units, lot_id))
            .await
    }

    /// Submits a prepared command.
    pub async fn execute(
        &self,
        command: &RestockSkuCommand,
    ) -> Result<RestockOutcome, InventoryError> {
        self.writer.restock(command).await
    }
}
