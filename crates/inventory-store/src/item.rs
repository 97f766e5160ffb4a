use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::StoreError;

/// Partition prefix shared by a SKU's ledger entries and its aggregate.
pub const SKU_PREFIX: &str = "SKU#";

/// Sort-key prefix of ledger entries.
pub const LOT_PREFIX: &str = "LOT#";

/// Secondary partition prefix grouping one SKU's ledger entries.
pub const LOTS_PREFIX: &str = "LOTS#";

/// Secondary partition holding every SKU aggregate.
pub const SKUS_PARTITION: &str = "SKUS";

/// Primary key of an item: partition key plus sort key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemKey {
    pub pk: String,
    pub sk: String,
}

impl ItemKey {
    pub fn new(pk: impl Into<String>, sk: impl Into<String>) -> Self {
        Self {
            pk: pk.into(),
            sk: sk.into(),
        }
    }

    /// Key of the ledger entry for one lot of a SKU.
    pub fn ledger_entry(sku: &str, lot_id: &str) -> Self {
        Self::new(sku_partition(sku), format!("{LOT_PREFIX}{lot_id}"))
    }

    /// Key of the running aggregate of a SKU.
    pub fn sku_aggregate(sku: &str) -> Self {
        let key = sku_partition(sku);
        Self::new(key.clone(), key)
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.pk, self.sk)
    }
}

/// Partition key shared by everything stored for a SKU.
pub fn sku_partition(sku: &str) -> String {
    format!("{SKU_PREFIX}{sku}")
}

/// Secondary partition key of a SKU's ledger entries.
pub fn lots_partition(sku: &str) -> String {
    format!("{LOTS_PREFIX}{sku}")
}

/// Kind of record stored under a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    LedgerEntry,
    SkuAggregate,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::LedgerEntry => "LedgerEntry",
            EntityType::SkuAggregate => "SkuAggregate",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LedgerEntry" => Ok(EntityType::LedgerEntry),
            "SkuAggregate" => Ok(EntityType::SkuAggregate),
            other => Err(format!("unknown entity type `{other}`")),
        }
    }
}

/// Secondary ordering key: grouping partition plus chronological sort value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexKey {
    pub gsi1pk: String,
    pub gsi1sk: String,
}

impl IndexKey {
    pub fn new(gsi1pk: impl Into<String>, gsi1sk: impl Into<String>) -> Self {
        Self {
            gsi1pk: gsi1pk.into(),
            gsi1sk: gsi1sk.into(),
        }
    }
}

/// A stored record.
///
/// Attributes other than the key and entity type are optional at this level:
/// the store enforces only what its writes need, and readers decide which
/// attributes their record kind requires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub key: ItemKey,
    pub entity_type: EntityType,
    pub index: Option<IndexKey>,
    pub sku: Option<String>,
    pub units: Option<i64>,
    pub lot_id: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Item {
    /// Creates an item holding only its key and entity type.
    pub fn new(key: ItemKey, entity_type: EntityType) -> Self {
        Self {
            key,
            entity_type,
            index: None,
            sku: None,
            units: None,
            lot_id: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_index(mut self, index: IndexKey) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = Some(sku.into());
        self
    }

    pub fn with_units(mut self, units: i64) -> Self {
        self.units = Some(units);
        self
    }

    pub fn with_lot_id(mut self, lot_id: impl Into<String>) -> Self {
        self.lot_id = Some(lot_id.into());
        self
    }

    pub fn with_created_at(mut self, created_at: impl Into<String>) -> Self {
        self.created_at = Some(created_at.into());
        self
    }

    pub fn with_updated_at(mut self, updated_at: impl Into<String>) -> Self {
        self.updated_at = Some(updated_at.into());
        self
    }

    /// Returns a required attribute or a [`StoreError::MalformedItem`]
    /// naming it.
    pub fn require<'a, T>(
        &self,
        attribute: &str,
        value: &'a Option<T>,
    ) -> Result<&'a T, StoreError> {
        value.as_ref().ok_or_else(|| StoreError::MalformedItem {
            key: self.key.to_string(),
            message: format!("missing attribute `{attribute}`"),
        })
    }
}
