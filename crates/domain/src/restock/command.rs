use chrono::{DateTime, Utc};
use common::{LotId, Sku, Timestamp, Units, ValidationError};
use serde::Serialize;
use serde_json::Value;

use crate::events::SkuRestocked;

/// Durable instruction to record one restock.
///
/// Fields are private and every constructor validates its input, so a
/// command reaching the writer is always complete. `created_at` and
/// `updated_at` are stamped when the command is built; the timestamps of the
/// originating event are never copied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestockSkuCommand {
    command_data: RestockSkuData,
    options: CommandOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestockSkuData {
    sku: Sku,
    units: Units,
    lot_id: LotId,
    created_at: Timestamp,
    updated_at: Timestamp,
}

/// Per-command options. None are defined yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommandOptions {}

impl RestockSkuCommand {
    /// Builds a command from already validated parts, stamped with the
    /// current time.
    pub fn new(sku: Sku, units: Units, lot_id: LotId) -> Self {
        Self::new_at(sku, units, lot_id, Utc::now())
    }

    /// Builds a command stamped with the given time.
    pub fn new_at(sku: Sku, units: Units, lot_id: LotId, now: DateTime<Utc>) -> Self {
        let stamp = Timestamp::from_datetime(now);
        Self {
            command_data: RestockSkuData {
                sku,
                units,
                lot_id,
                created_at: stamp.clone(),
                updated_at: stamp,
            },
            options: CommandOptions::default(),
        }
    }

    pub fn from_event(event: &SkuRestocked) -> Self {
        Self::from_event_at(event, Utc::now())
    }

    pub fn from_event_at(event: &SkuRestocked, now: DateTime<Utc>) -> Self {
        Self::new_at(
            event.sku().clone(),
            event.units(),
            event.lot_id().clone(),
            now,
        )
    }

    /// Validates a raw event payload and builds a command from it.
    pub fn from_payload(payload: &Value) -> Result<Self, ValidationError> {
        let event = SkuRestocked::from_payload(payload)?;
        Ok(Self::from_event(&event))
    }

    pub fn options(&self) -> &CommandOptions {
        &self.options
    }

    pub fn sku(&self) -> &Sku {
        &self.command_data.sku
    }

    pub fn units(&self) -> Units {
        self.command_data.units
    }

    pub fn lot_id(&self) -> &LotId {
        &self.command_data.lot_id
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.command_data.created_at
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.command_data.updated_at
    }
}
