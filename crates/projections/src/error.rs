//! Query error types.

use common::ValidationError;
use inventory_store::StoreError;
use thiserror::Error;

/// Errors that can occur while reading inventory.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Query parameters failed validation.
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    /// The store failed or returned rows that could not be read.
    #[error("Transient store failure: {0}")]
    Transient(#[from] StoreError),
}

impl QueryError {
    /// Whether repeating the same query may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, QueryError::Transient(_))
    }
}

/// Result type for query operations.
pub type Result<T> = std::result::Result<T, QueryError>;
