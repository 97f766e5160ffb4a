//! Integration tests for the API server.

use std::sync::OnceLock;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use inventory_store::{InMemoryInventoryStore, InventoryStore, ItemKey};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{Value, json};
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> (axum::Router, InMemoryInventoryStore) {
    let store = InMemoryInventoryStore::new();
    let state = api::create_state(store.clone());
    (api::create_app(state, get_metrics_handle()), store)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

async fn restock(app: &axum::Router, sku: &str, units: i64, lot: &str) -> (StatusCode, Value) {
    send(
        app,
        post_json(
            &format!("/skus/{sku}/restock"),
            &json!({ "units": units, "lotId": lot }),
        ),
    )
    .await
}

async fn aggregate_units(store: &InMemoryInventoryStore, sku: &str) -> Option<i64> {
    store
        .get_item(&ItemKey::sku_aggregate(sku))
        .await
        .unwrap()
        .and_then(|item| item.units)
}

fn change_record(sku: &str, units: i64, lot: &str) -> Value {
    json!({
        "source": "warehouse.events",
        "detail-type": "INSERT",
        "detail": { "dynamodb": { "NewImage": {
            "eventName": { "S": "WAREHOUSE_SKU_RESTOCKED_EVENT" },
            "eventData": { "M": {
                "sku": { "S": sku },
                "units": { "N": units.to_string() },
                "lotId": { "S": lot }
            }},
            "createdAt": { "S": "2024-03-01T09:00:00.000Z" },
            "updatedAt": { "S": "2024-03-01T09:00:00.000Z" }
        }}}
    })
}

fn event_payload(sku: &str, units: i64, lot: &str) -> Value {
    json!({
        "eventName": "WAREHOUSE_SKU_RESTOCKED_EVENT",
        "eventData": { "sku": sku, "units": units, "lotId": lot },
        "createdAt": "2024-03-01T09:00:00.000Z",
        "updatedAt": "2024-03-01T09:00:00.000Z"
    })
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = setup();

    let (status, json) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_metrics_endpoint_reports_restocks() {
    let (app, _) = setup();
    restock(&app, "SKU-METRICS", 1, "LOT0001").await;

    let response = app.clone().oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("inventory_restock_applied_total"));
}

#[tokio::test]
async fn test_restock_then_replay_is_duplicate() {
    let (app, store) = setup();

    let (status, json) = restock(&app, "SKU1234", 12, "LOT0001").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["outcome"], "applied");

    let (status, json) = restock(&app, "SKU1234", 12, "LOT0001").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["outcome"], "duplicate");

    assert_eq!(aggregate_units(&store, "SKU1234").await, Some(12));
}

#[tokio::test]
async fn test_distinct_lots_accumulate() {
    let (app, _) = setup();
    restock(&app, "SKU1234", 5, "LOT0001").await;
    restock(&app, "SKU1234", 3, "LOT0002").await;

    let (status, json) = send(&app, get("/skus/SKU1234")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["sku"], "SKU1234");
    assert_eq!(json[0]["units"], 8);
    assert!(json[0]["createdAt"].is_string());

    let (status, json) = send(&app, get("/skus/SKU1234/lots")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 2);
    assert_eq!(json[0]["lotId"], "LOT0001");
}

#[tokio::test]
async fn test_events_endpoint_ingests_change_record() {
    let (app, store) = setup();
    let record = change_record("SKU1234", 12, "LOT0001");

    let (status, json) = send(&app, post_json("/events", &record)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["outcome"], "applied");

    let (status, json) = send(&app, post_json("/events", &record)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["outcome"], "duplicate");

    assert_eq!(aggregate_units(&store, "SKU1234").await, Some(12));
}

#[tokio::test]
async fn test_commands_endpoint_ingests_event_payload() {
    let (app, store) = setup();

    let (status, json) = send(
        &app,
        post_json("/commands/restock", &event_payload("SKU1234", 7, "LOT0009")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["outcome"], "applied");

    let (status, json) = send(
        &app,
        post_json("/commands/restock", &event_payload("SKU1234", 7, "LOT0009")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["outcome"], "duplicate");
    assert_eq!(aggregate_units(&store, "SKU1234").await, Some(7));
}

#[tokio::test]
async fn test_invalid_restock_is_rejected_without_store_call() {
    let (app, store) = setup();

    let cases = [
        ("/skus/SKU1234/restock", json!({ "units": 0, "lotId": "LOT0001" })),
        ("/skus/SKU1234/restock", json!({ "units": 5, "lotId": "L1" })),
        ("/skus/SKU1234/restock", json!({ "units": "5", "lotId": "LOT0001" })),
        ("/skus/S1/restock", json!({ "units": 5, "lotId": "LOT0001" })),
        ("/skus/SKU1234/restock", json!({ "lotId": "LOT0001" })),
    ];

    for (uri, body) in &cases {
        let (status, json) = send(&app, post_json(uri, body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri} {body}");
        assert!(json["error"].is_string());
    }

    let mut payload = event_payload("SKU1234", 5, "LOT0001");
    payload["eventName"] = json!("WAREHOUSE_SKU_DEPLETED_EVENT");
    let (status, json) = send(&app, post_json("/commands/restock", &payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("eventName"));

    let wrapped = json!({ "event": event_payload("SKU1234", 5, "LOT0001") });
    let (status, json) = send(&app, post_json("/commands/restock", &wrapped)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("eventName"));

    let (status, _) = send(&app, post_json("/events", &json!({ "source": "x" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(store.call_count(), 0);
}

#[tokio::test]
async fn test_list_defaults_and_overrides() {
    let (app, _) = setup();
    for n in 0..60 {
        restock(&app, &format!("SKU{n:04}"), 1, "LOT0001").await;
    }

    let (status, json) = send(&app, get("/skus")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 50);

    let (status, json) = send(&app, get("/skus?direction=desc&limit=30")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 30);
}

#[tokio::test]
async fn test_list_is_in_creation_order() {
    let (app, _) = setup();
    for sku in ["SKU_B", "SKU_A", "SKU_C"] {
        restock(&app, sku, 1, "LOT0001").await;
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }

    let (_, json) = send(&app, get("/skus")).await;
    let skus: Vec<_> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["sku"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(skus, vec!["SKU_B", "SKU_A", "SKU_C"]);

    let (_, json) = send(&app, get("/skus?direction=DESC&limit=1")).await;
    assert_eq!(json[0]["sku"], "SKU_C");
}

#[tokio::test]
async fn test_invalid_list_parameters() {
    let (app, _) = setup();

    for uri in [
        "/skus?limit=0",
        "/skus?limit=101",
        "/skus?limit=ten",
        "/skus?direction=sideways",
    ] {
        let (status, json) = send(&app, get(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(json["error"].as_str().unwrap().contains("Invalid field"));
    }
}

#[tokio::test]
async fn test_unknown_sku_is_empty_array() {
    let (app, _) = setup();

    let (status, json) = send(&app, get("/skus/NOPE0000")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!([]));
}

#[tokio::test]
async fn test_unavailable_store_is_503() {
    let (app, store) = setup();
    store.set_unavailable(true);

    let (status, json) = restock(&app, "SKU1234", 5, "LOT0001").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(json["error"].is_string());

    let (status, _) = send(&app, get("/skus")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    store.set_unavailable(false);
    let (status, _) = restock(&app, "SKU1234", 5, "LOT0001").await;
    assert_eq!(status, StatusCode::CREATED);
}
