//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use common::ValidationError;
use domain::InventoryError;
use inventory_store::StoreError;
use projections::QueryError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client. Retrying cannot help.
    BadRequest(String),
    /// The store is failing. The client may retry the same request.
    Unavailable(String),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unavailable(msg) => {
                tracing::warn!(error = %msg, "store unavailable");
                (StatusCode::SERVICE_UNAVAILABLE, msg)
            }
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<InventoryError> for ApiError {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::InvalidInput(e) => e.into(),
            InventoryError::Transient(StoreError::InvalidTransaction(_)) => {
                ApiError::Internal(err.to_string())
            }
            InventoryError::Transient(_) => ApiError::Unavailable(err.to_string()),
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::InvalidInput(e) => e.into(),
            QueryError::Transient(StoreError::InvalidTransaction(_)) => {
                ApiError::Internal(err.to_string())
            }
            QueryError::Transient(_) => ApiError::Unavailable(err.to_string()),
        }
    }
}
