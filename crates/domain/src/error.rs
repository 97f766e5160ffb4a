//! Domain error types.

use common::ValidationError;
use inventory_store::StoreError;
use thiserror::Error;

/// Errors that can occur while recording a restock.
///
/// A lot that was already recorded is not an error: the writer reports it as
/// [`crate::RestockOutcome::Duplicate`].
#[derive(Debug, Error)]
pub enum InventoryError {
    /// The input failed validation. Retrying the same input cannot succeed.
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    /// The store failed or rejected the transaction for a reason other than
    /// the lot already existing. The same command may be resubmitted.
    #[error("Transient store failure: {0}")]
    Transient(#[source] StoreError),
}

/// Coarse classification used by callers to pick a retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    Transient,
}

impl InventoryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            InventoryError::InvalidInput(_) => ErrorKind::InvalidInput,
            InventoryError::Transient(_) => ErrorKind::Transient,
        }
    }

    /// Whether resubmitting the same input may succeed.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Transient
    }
}
