//! Integration tests for the restock flow.
//!
//! These tests drive the service against the in-memory store and check the
//! ledger and aggregate the way a reader would see them.

use common::{LotId, Sku, Units};
use domain::{InventoryError, RestockOutcome, RestockService, RestockSkuCommand};
use futures_util::future::join_all;
use inventory_store::{InMemoryInventoryStore, InventoryStore, ItemKey, ItemQuery};
use serde_json::{Value, json};

/// Helper to create a test restock service
fn create_service() -> (RestockService<InMemoryInventoryStore>, InMemoryInventoryStore) {
    let store = InMemoryInventoryStore::new();
    (RestockService::new(store.clone()), store)
}

fn command(sku: &str, units: i64, lot: &str) -> RestockSkuCommand {
    RestockSkuCommand::new(
        Sku::parse(sku).unwrap(),
        Units::new(units).unwrap(),
        LotId::parse(lot).unwrap(),
    )
}

fn event_payload(sku: &str, units: i64, lot: &str) -> Value {
    json!({
        "eventName": "WAREHOUSE_SKU_RESTOCKED_EVENT",
        "eventData": { "sku": sku, "units": units, "lotId": lot },
        "createdAt": "2024-03-01T09:00:00.000Z",
        "updatedAt": "2024-03-01T09:00:00.000Z"
    })
}

fn change_record(sku: &str, units: i64, lot: &str) -> Value {
    json!({
        "source": "warehouse.events",
        "detail-type": "INSERT",
        "detail": { "dynamodb": { "NewImage": {
            "pk": { "S": format!("EVENT#{lot}") },
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

async fn aggregate_units(store: &InMemoryInventoryStore, sku: &str) -> Option<i64> {
    store
        .get_item(&ItemKey::sku_aggregate(sku))
        .await
        .unwrap()
        .and_then(|item| item.units)
}

async fn ledger_count(store: &InMemoryInventoryStore, sku: &str) -> usize {
    store
        .query(ItemQuery::table(format!("SKU#{sku}")).sort_key_prefix("LOT#"))
        .await
        .unwrap()
        .into_items()
        .len()
}

mod scenario {
    use super::*;

    #[tokio::test]
    async fn first_restock_creates_aggregate_and_replay_is_duplicate() {
        let (service, store) = create_service();
        let record = change_record("SKU1234", 12, "LOT0001");

        let outcome = service.handle_change_record(&record).await.unwrap();
        assert_eq!(outcome, RestockOutcome::Applied);
        assert_eq!(aggregate_units(&store, "SKU1234").await, Some(12));

        let outcome = service.handle_change_record(&record).await.unwrap();
        assert_eq!(outcome, RestockOutcome::Duplicate);
        assert_eq!(aggregate_units(&store, "SKU1234").await, Some(12));
        assert_eq!(ledger_count(&store, "SKU1234").await, 1);
    }

    #[tokio::test]
    async fn event_payload_path_matches_change_record_path() {
        let (service, store) = create_service();

        let outcome = service
            .handle_event_payload(&event_payload("SKU1234", 12, "LOT0001"))
            .await
            .unwrap();
        assert_eq!(outcome, RestockOutcome::Applied);

        let outcome = service
            .handle_change_record(&change_record("SKU1234", 12, "LOT0001"))
            .await
            .unwrap();
        assert_eq!(outcome, RestockOutcome::Duplicate);
        assert_eq!(aggregate_units(&store, "SKU1234").await, Some(12));
    }

    #[tokio::test]
    async fn ledger_entry_keeps_command_time_not_event_time() {
        let (service, store) = create_service();
        service
            .handle_event_payload(&event_payload("SKU1234", 12, "LOT0001"))
            .await
            .unwrap();

        let entry = store
            .get_item(&ItemKey::ledger_entry("SKU1234", "LOT0001"))
            .await
            .unwrap()
            .unwrap();
        assert_ne!(
            entry.created_at.as_deref(),
            Some("2024-03-01T09:00:00.000Z")
        );
        assert_eq!(entry.created_at, entry.updated_at);
    }
}

mod idempotency {
    use super::*;

    #[tokio::test]
    async fn sequential_redelivery_applies_once() {
        let (service, store) = create_service();
        let cmd = command("SKU1234", 7, "LOT0001");

        let mut outcomes = Vec::new();
        for _ in 0..5 {
            outcomes.push(service.execute(&cmd).await.unwrap());
        }

        assert_eq!(outcomes[0], RestockOutcome::Applied);
        assert!(outcomes[1..].iter().all(|o| *o == RestockOutcome::Duplicate));
        assert_eq!(aggregate_units(&store, "SKU1234").await, Some(7));
    }

    #[tokio::test]
    async fn rebuilt_command_for_same_lot_is_duplicate() {
        let (service, store) = create_service();

        service
            .execute(&command("SKU1234", 7, "LOT0001"))
            .await
            .unwrap();
        let outcome = service
            .execute(&command("SKU1234", 7, "LOT0001"))
            .await
            .unwrap();

        assert_eq!(outcome, RestockOutcome::Duplicate);
        assert_eq!(aggregate_units(&store, "SKU1234").await, Some(7));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_redelivery_applies_once() {
        let (service, store) = create_service();
        let service = std::sync::Arc::new(service);
        let cmd = command("SKU1234", 9, "LOT0001");

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let service = service.clone();
                let cmd = cmd.clone();
                tokio::spawn(async move { service.execute(&cmd).await })
            })
            .collect();

        let outcomes: Vec<RestockOutcome> = join_all(handles)
            .await
            .into_iter()
            .map(|joined| joined.unwrap().unwrap())
            .collect();

        let applied = outcomes
            .iter()
            .filter(|o| **o == RestockOutcome::Applied)
            .count();
        assert_eq!(applied, 1);
        assert_eq!(aggregate_units(&store, "SKU1234").await, Some(9));
        assert_eq!(ledger_count(&store, "SKU1234").await, 1);
    }
}

mod additivity {
    use super::*;

    const RESTOCKS: [(i64, &str); 3] = [(5, "LOT0001"), (3, "LOT0002"), (7, "LOT0003")];

    #[tokio::test]
    async fn every_order_sums_to_total() {
        let orders = [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];

        for order in orders {
            let (service, store) = create_service();
            for i in order {
                let (units, lot) = RESTOCKS[i];
                service
                    .execute(&command("SKU1234", units, lot))
                    .await
                    .unwrap();
            }
            assert_eq!(aggregate_units(&store, "SKU1234").await, Some(15));
        }
    }

    #[tokio::test]
    async fn aggregate_keeps_first_creation_time() {
        let (service, store) = create_service();

        let first = command("SKU1234", 5, "LOT0001");
        service.execute(&first).await.unwrap();
        service
            .execute(&command("SKU1234", 3, "LOT0002"))
            .await
            .unwrap();

        let aggregate = store
            .get_item(&ItemKey::sku_aggregate("SKU1234"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            aggregate.created_at.as_deref(),
            Some(first.created_at().as_str())
        );
        assert_eq!(
            aggregate.index.map(|i| i.gsi1sk),
            Some(first.created_at().to_string())
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_distinct_lots_sum_to_total() {
        let (service, store) = create_service();
        let service = std::sync::Arc::new(service);

        let handles: Vec<_> = RESTOCKS
            .iter()
            .map(|(units, lot)| {
                let service = service.clone();
                let cmd = command("SKU1234", *units, lot);
                tokio::spawn(async move { service.execute(&cmd).await })
            })
            .collect();

        for joined in join_all(handles).await {
            assert_eq!(joined.unwrap().unwrap(), RestockOutcome::Applied);
        }
        assert_eq!(aggregate_units(&store, "SKU1234").await, Some(15));
        assert_eq!(ledger_count(&store, "SKU1234").await, 3);
    }
}

mod validation {
    use super::*;

    fn assert_rejected(err: InventoryError, field: &str) {
        match err {
            InventoryError::InvalidInput(e) => assert_eq!(e.field, field),
            other => panic!("expected invalid input for {field}, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn invalid_payloads_never_reach_the_store() {
        let (service, store) = create_service();

        let cases: Vec<(&str, Box<dyn Fn(&mut Value)>)> = vec![
            ("eventData.sku", Box::new(|p: &mut Value| p["eventData"]["sku"] = Value::Null)),
            ("eventData.sku", Box::new(|p: &mut Value| p["eventData"]["sku"] = json!(""))),
            ("eventData.sku", Box::new(|p: &mut Value| p["eventData"]["sku"] = json!("abc"))),
            (
                "eventData.sku",
                Box::new(|p: &mut Value| {
                    p["eventData"].as_object_mut().unwrap().remove("sku");
                }),
            ),
            ("eventData.units", Box::new(|p: &mut Value| p["eventData"]["units"] = json!(0))),
            ("eventData.units", Box::new(|p: &mut Value| p["eventData"]["units"] = json!(-4))),
            ("eventData.units", Box::new(|p: &mut Value| p["eventData"]["units"] = json!(1.5))),
            ("eventData.units", Box::new(|p: &mut Value| p["eventData"]["units"] = json!("12"))),
            ("eventData.units", Box::new(|p: &mut Value| p["eventData"]["units"] = Value::Null)),
            ("eventData.lotId", Box::new(|p: &mut Value| p["eventData"]["lotId"] = json!("  "))),
            (
                "eventData.lotId",
                Box::new(|p: &mut Value| {
                    p["eventData"].as_object_mut().unwrap().remove("lotId");
                }),
            ),
            ("createdAt", Box::new(|p: &mut Value| p["createdAt"] = Value::Null)),
            ("createdAt", Box::new(|p: &mut Value| p["createdAt"] = json!(""))),
            ("updatedAt", Box::new(|p: &mut Value| p["updatedAt"] = json!(20240301))),
            (
                "updatedAt",
                Box::new(|p: &mut Value| {
                    p.as_object_mut().unwrap().remove("updatedAt");
                }),
            ),
            ("eventName", Box::new(|p: &mut Value| p["eventName"] = json!("OTHER_EVENT"))),
            ("eventName", Box::new(|p: &mut Value| p["eventName"] = Value::Null)),
            ("eventData", Box::new(|p: &mut Value| p["eventData"] = json!("SKU1234"))),
        ];

        for (field, mutate) in cases {
            let mut payload = event_payload("SKU1234", 12, "LOT0001");
            mutate(&mut payload);

            let err = service.handle_event_payload(&payload).await.unwrap_err();
            assert!(!err.is_retryable());
            assert_rejected(err, field);
        }

        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn invalid_change_records_never_reach_the_store() {
        let (service, store) = create_service();

        let mut record = change_record("SKU1234", 12, "LOT0001");
        record["detail"]["dynamodb"]["NewImage"]["eventData"]["M"]["units"] = json!({ "N": "0" });
        let err = service.handle_change_record(&record).await.unwrap_err();
        assert_rejected(err, "eventData.units");

        let mut record = change_record("SKU1234", 12, "LOT0001");
        record.as_object_mut().unwrap().remove("source");
        let err = service.handle_change_record(&record).await.unwrap_err();
        assert_rejected(err, "source");

        let err = service
            .handle_change_record(&event_payload("SKU1234", 12, "LOT0001"))
            .await
            .unwrap_err();
        assert_rejected(err, "source");

        assert_eq!(store.call_count(), 0);
    }
}

mod failures {
    use super::*;

    #[tokio::test]
    async fn unavailable_store_is_retryable_and_retry_applies() {
        let (service, store) = create_service();
        let cmd = command("SKU1234", 12, "LOT0001");

        store.set_unavailable(true);
        let err = service.execute(&cmd).await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(store.item_count().await, 0);

        store.set_unavailable(false);
        assert_eq!(service.execute(&cmd).await.unwrap(), RestockOutcome::Applied);
        assert_eq!(aggregate_units(&store, "SKU1234").await, Some(12));
    }
}
