//! Shared value types and validation rules for the inventory ledger.

pub mod types;
pub mod validation;

pub use types::{LotId, Sku, Timestamp, Units};
pub use validation::{ValidationError, ValidationReason};
