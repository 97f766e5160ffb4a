use thiserror::Error;

use crate::transaction::CancellationReason;

/// Errors that can occur when interacting with the item store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A transactional write was rejected as a whole.
    ///
    /// `reasons` holds one entry per operation, in request order. Operations
    /// that did not cause the cancellation report [`CancellationReason::None`].
    #[error("Transaction canceled: {reasons:?}")]
    TransactionCanceled { reasons: Vec<CancellationReason> },

    /// The request itself is not a valid transaction.
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    /// The store cannot be reached.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A stored item is missing attributes or has unexpected values.
    #[error("Malformed item {key}: {message}")]
    MalformedItem { key: String, message: String },

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    /// Returns the cancellation reason reported for the operation at `index`,
    /// if this error is a transaction cancellation.
    pub fn cancellation_reason(&self, index: usize) -> Option<CancellationReason> {
        match self {
            StoreError::TransactionCanceled { reasons } => reasons.get(index).copied(),
            _ => None,
        }
    }
}

/// Result type for item store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_reason_by_index() {
        let err = StoreError::TransactionCanceled {
            reasons: vec![
                CancellationReason::ConditionalCheckFailed,
                CancellationReason::None,
            ],
        };

        assert_eq!(
            err.cancellation_reason(0),
            Some(CancellationReason::ConditionalCheckFailed)
        );
        assert_eq!(err.cancellation_reason(1), Some(CancellationReason::None));
        assert_eq!(err.cancellation_reason(2), None);
    }

    #[test]
    fn other_errors_have_no_cancellation_reason() {
        let err = StoreError::Unavailable("connection refused".to_string());
        assert_eq!(err.cancellation_reason(0), None);
    }
}
