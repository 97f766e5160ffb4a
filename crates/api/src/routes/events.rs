//! Ingestion endpoints for the upstream event feed.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use inventory_store::InventoryStore;
use serde_json::Value;

use super::{RestockResponse, restock_response};
use crate::error::ApiError;
use crate::state::AppState;

/// POST /events: accepts one change record carrying a restock event in
/// its typed new image.
pub async fn ingest<S: InventoryStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(record): Json<Value>,
) -> Result<(StatusCode, Json<RestockResponse>), ApiError> {
    let outcome = state.restock.handle_change_record(&record).await?;
    Ok(restock_response(outcome))
}

/// POST /commands/restock: accepts the restock event itself,
/// `{"eventName", "eventData", "createdAt", "updatedAt"}`, with no envelope.
pub async fn restock<S: InventoryStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(payload): Json<Value>,
) -> Result<(StatusCode, Json<RestockResponse>), ApiError> {
    let outcome = state.restock.handle_event_payload(&payload).await?;
    Ok(restock_response(outcome))
}
