//! HTTP route handlers.

pub mod events;
pub mod health;
pub mod metrics;
pub mod skus;

use axum::Json;
use axum::http::StatusCode;
use domain::RestockOutcome;
use serde::Serialize;

#[derive(Serialize)]
pub struct RestockResponse {
    pub outcome: &'static str,
}

/// A first-time restock is `201 Created`; a replay of a recorded lot is
/// acknowledged with `200 OK` and changes nothing.
pub(crate) fn restock_response(outcome: RestockOutcome) -> (StatusCode, Json<RestockResponse>) {
    let status = match outcome {
        RestockOutcome::Applied => StatusCode::CREATED,
        RestockOutcome::Duplicate => StatusCode::OK,
    };
    (
        status,
        Json(RestockResponse {
            outcome: outcome.as_str(),
        }),
    )
}
