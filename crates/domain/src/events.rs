//! Restock domain events.

use common::{LotId, Sku, Timestamp, Units, ValidationError, validation};
use serde::Serialize;
use serde_json::Value;

/// Name carried by every restock event.
pub const SKU_RESTOCKED_EVENT: &str = "WAREHOUSE_SKU_RESTOCKED_EVENT";

/// "N units of a SKU were restocked under a lot."
///
/// Only constructible from validated parts, so holding one means every field
/// already passed the value rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkuRestocked {
    event_name: &'static str,
    event_data: SkuRestockedData,
    created_at: Timestamp,
    updated_at: Timestamp,
}

/// Payload of a [`SkuRestocked`] event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkuRestockedData {
    pub sku: Sku,
    pub units: Units,
    pub lot_id: LotId,
}

impl SkuRestocked {
    pub fn new(
        sku: Sku,
        units: Units,
        lot_id: LotId,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            event_name: SKU_RESTOCKED_EVENT,
            event_data: SkuRestockedData { sku, units, lot_id },
            created_at,
            updated_at,
        }
    }

    /// Validates a plain JSON payload of the form
    /// `{ eventName, eventData: { sku, units, lotId }, createdAt, updatedAt }`.
    ///
    /// Attributes beyond these are ignored. The first offending field is
    /// reported by its dotted path.
    pub fn from_payload(payload: &Value) -> Result<Self, ValidationError> {
        let event = validation::object("event", Some(payload))?;

        validation::literal("eventName", event.get("eventName"), SKU_RESTOCKED_EVENT)?;

        let data = validation::object("eventData", event.get("eventData"))?;
        let sku = Sku::from_field("eventData.sku", data.get("sku"))?;
        let units = Units::from_field("eventData.units", data.get("units"))?;
        let lot_id = LotId::from_field("eventData.lotId", data.get("lotId"))?;

        let created_at = Timestamp::from_field("createdAt", event.get("createdAt"))?;
        let updated_at = Timestamp::from_field("updatedAt", event.get("updatedAt"))?;

        Ok(Self::new(sku, units, lot_id, created_at, updated_at))
    }

    pub fn event_name(&self) -> &'static str {
        self.event_name
    }

    pub fn sku(&self) -> &Sku {
        &self.event_data.sku
    }

    pub fn units(&self) -> Units {
        self.event_data.units
    }

    pub fn lot_id(&self) -> &LotId {
        &self.event_data.lot_id
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }
}
