//! SKU query and direct restock endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::{LotId, Sku, Units, ValidationError, ValidationReason};
use inventory_store::InventoryStore;
use projections::{LedgerEntryView, ListParams, SkuAggregateView};
use serde::Deserialize;
use serde_json::Value;

use super::{RestockResponse, restock_response};
use crate::error::ApiError;
use crate::state::AppState;

/// Query string of the list endpoints.
///
/// `limit` is taken as text so a non-numeric value is reported with the
/// same error body as every other validation failure.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub direction: Option<String>,
    pub limit: Option<String>,
}

impl ListQuery {
    pub fn params(&self) -> Result<ListParams, ValidationError> {
        let limit = self
            .limit
            .as_deref()
            .map(|raw| {
                raw.trim()
                    .parse::<i64>()
                    .map_err(|_| ValidationError::new("limit", ValidationReason::NotInteger))
            })
            .transpose()?;
        ListParams::parse(self.direction.as_deref(), limit)
    }
}

/// GET /skus: SKU aggregates in creation order.
pub async fn list<S: InventoryStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<SkuAggregateView>>, ApiError> {
    let params = query.params()?;
    Ok(Json(state.reader.list(params).await?))
}

/// GET /skus/{sku}: the aggregate of one SKU, as a zero- or one-element
/// array.
pub async fn get<S: InventoryStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(sku): Path<String>,
) -> Result<Json<Vec<SkuAggregateView>>, ApiError> {
    let sku = Sku::parse(&sku)?;
    Ok(Json(state.reader.list_by_sku(&sku).await?))
}

/// GET /skus/{sku}/lots: ledger entries of one SKU in creation order.
pub async fn lots<S: InventoryStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(sku): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<LedgerEntryView>>, ApiError> {
    let sku = Sku::parse(&sku)?;
    let params = query.params()?;
    Ok(Json(state.reader.list_lots(&sku, params).await?))
}

/// POST /skus/{sku}/restock: records a lot for the SKU in the path.
///
/// Body: `{"units": <int>, "lotId": "<id>"}`.
pub async fn restock<S: InventoryStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(sku): Path<String>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<RestockResponse>), ApiError> {
    let sku = Sku::parse(&sku)?;
    let units = Units::from_field("units", body.get("units"))?;
    let lot_id = LotId::from_field("lotId", body.get("lotId"))?;

    let outcome = state.restock.restock(sku, units, lot_id).await?;
    Ok(restock_response(outcome))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(direction: Option<&str>, limit: Option<&str>) -> ListQuery {
        ListQuery {
            direction: direction.map(str::to_string),
            limit: limit.map(str::to_string),
        }
    }

    #[test]
    fn empty_query_uses_defaults() {
        assert_eq!(query(None, None).params().unwrap(), ListParams::default());
    }

    #[test]
    fn non_numeric_limit_is_rejected() {
        let err = query(None, Some("ten")).params().unwrap_err();
        assert_eq!(err.field, "limit");
        assert_eq!(err.reason, ValidationReason::NotInteger);
    }

    #[test]
    fn desc_and_limit_are_parsed() {
        let params = query(Some("DESC"), Some("30")).params().unwrap();
        assert_eq!(params.limit, 30);
        assert!(!params.direction.is_forward());
    }
}
