//! Integration tests for the REST endpoints.
//!
//! Requests go through the full router via `tower::ServiceExt::oneshot`
//! against the in-memory store, without binding a socket.

#![allow(clippy::panic, clippy::indexing_slicing)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use reservoir_gateway::api::build_router;
use reservoir_gateway::app_state::AppState;
use reservoir_gateway::domain::{BroadcastHub, ReservoirId};
use reservoir_gateway::persistence::MemoryStore;
use serde_json::{Value, json};
use tower::ServiceExt;

struct Harness {
    app: Router,
    store: MemoryStore,
    hub: BroadcastHub,
}

fn harness() -> Harness {
    let store = MemoryStore::new();
    let hub = BroadcastHub::new();
    let app = build_router().with_state(AppState::new(store.clone(), hub.clone()));
    Harness { app, store, hub }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let Ok(response) = app.clone().oneshot(request).await else {
        panic!("router failed");
    };
    let status = response.status();
    let Ok(bytes) = axum::body::to_bytes(response.into_body(), usize::MAX).await else {
        panic!("body read failed");
    };
    (status, bytes.to_vec())
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let Ok(request) = Request::get(uri).body(Body::empty()) else {
        panic!("bad request");
    };
    let (status, bytes) = send(app, request).await;
    let Ok(body) = serde_json::from_slice(&bytes) else {
        panic!("response is not JSON: {}", String::from_utf8_lossy(&bytes));
    };
    (status, body)
}

async fn post_json(app: &Router, uri: &str, body: &Value) -> (StatusCode, Vec<u8>) {
    let Ok(request) = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
    else {
        panic!("bad request");
    };
    send(app, request).await
}

async fn submit(app: &Router, reservoirs: Value) -> (StatusCode, Value) {
    let (status, bytes) =
        post_json(app, "/submit_data", &json!({ "waterReservoirs": reservoirs })).await;
    let Ok(body) = serde_json::from_slice(&bytes) else {
        panic!("response is not JSON");
    };
    (status, body)
}

#[tokio::test]
async fn health_reports_healthy() {
    let h = harness();
    let (status, body) = get_json(&h.app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn submitted_filling_is_returned_by_latest() {
    let h = harness();
    let (status, body) = submit(
        &h.app,
        json!([{ "name": "Kapchagay", "category": "south", "filling": 82.5, "water_level": "478.2" }]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "success", "records": 1 }));

    let (_, list) = get_json(&h.app, "/api/reservoirs/all").await;
    let Some(id) = list[0]["id"].as_i64() else {
        panic!("missing id in {list}");
    };
    assert_eq!(list[0]["name"], "Kapchagay");
    assert_eq!(list[0]["category"], "south");
    assert_eq!(list[0]["lat"], Value::Null);

    let (status, latest) = get_json(&h.app, &format!("/api/reservoirs/{id}/latest")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(latest["reservoir_id"], id);
    assert_eq!(latest["filling"], 82.5);
    assert_eq!(latest["water_level"], 478.2);
    assert!(latest["timestamp"].is_string());
}

#[tokio::test]
async fn string_zero_is_stored_as_null() {
    let h = harness();
    let (status, _) = submit(&h.app, json!([{ "name": "Shardara", "water_level": "0" }])).await;
    assert_eq!(status, StatusCode::OK);

    let (_, latest) = get_json(&h.app, "/api/reservoirs/1/latest").await;
    assert_eq!(latest["water_level"], Value::Null);
}

#[tokio::test]
async fn bad_metric_rejects_whole_batch() {
    let h = harness();
    let mut viewer = h.hub.connect();

    let (status, body) = submit(
        &h.app,
        json!([
            { "name": "A", "filling": 10 },
            { "name": "B", "filling": "n/a" },
            { "name": "C", "filling": 30 },
        ]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], 1002);
    assert_eq!(body["error"]["details"], "record=1 stage=coerce");

    let (_, list) = get_json(&h.app, "/api/reservoirs/all").await;
    assert_eq!(list, json!([]));
    assert_eq!(h.store.status_count().await, 0);

    h.hub.disconnect(viewer.id());
    assert!(viewer.recv().await.is_none());
}

#[tokio::test]
async fn empty_batch_succeeds_without_writes_or_events() {
    let h = harness();
    let mut viewer = h.hub.connect();

    let (status, body) = submit(&h.app, json!([])).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "success", "records": 0 }));
    assert_eq!(h.store.status_count().await, 0);

    h.hub.disconnect(viewer.id());
    assert!(viewer.recv().await.is_none());
}

#[tokio::test]
async fn resubmitting_reuses_reservoir_by_name() {
    let h = harness();
    for filling in [10, 20] {
        let (status, _) = submit(&h.app, json!([{ "name": "Bukhtarma", "filling": filling }])).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (_, list) = get_json(&h.app, "/api/reservoirs/all").await;
    assert_eq!(list.as_array().map(Vec::len), Some(1));
    assert_eq!(h.store.status_count().await, 2);

    let (_, latest) = get_json(&h.app, "/api/reservoirs/1/latest").await;
    assert_eq!(latest["filling"], 20.0);
}

#[tokio::test]
async fn each_viewer_gets_one_event_per_record() {
    let h = harness();
    let mut first = h.hub.connect();
    let mut second = h.hub.connect();

    let (status, _) = submit(
        &h.app,
        json!([{ "name": "Kapchagay", "filling": "82.5" }, { "name": "Shardara" }]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    for viewer in [&mut first, &mut second] {
        let Some(a) = viewer.recv().await else {
            panic!("missing first event");
        };
        let Some(b) = viewer.recv().await else {
            panic!("missing second event");
        };
        assert_eq!((a.name.as_str(), a.fill_percent), ("Kapchagay", Some(82.5)));
        assert_eq!((b.name.as_str(), b.fill_percent), ("Shardara", None));
    }
}

#[tokio::test]
async fn events_carry_stored_coordinates() {
    let h = harness();
    let (status, _) = submit(&h.app, json!([{ "name": "Kapchagay" }])).await;
    assert_eq!(status, StatusCode::OK);
    assert!(h.store.set_coordinates(ReservoirId::new(1), 43.9, 77.1).await.is_ok());

    let mut viewer = h.hub.connect();
    let (status, _) = submit(&h.app, json!([{ "name": "Kapchagay", "filling": 50 }])).await;
    assert_eq!(status, StatusCode::OK);

    let Some(event) = viewer.recv().await else {
        panic!("missing event");
    };
    assert_eq!(event.id, ReservoirId::new(1));
    assert_eq!((event.lat, event.lon), (Some(43.9), Some(77.1)));
}

#[tokio::test]
async fn trailing_slash_submit_is_routed() {
    let h = harness();
    let (status, _) = post_json(
        &h.app,
        "/submit_data/",
        &json!({ "waterReservoirs": [{ "name": "Kapchagay" }] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn empty_name_is_a_client_error() {
    let h = harness();
    let (status, body) = submit(&h.app, json!([{ "filling": 1 }])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"], "record=0 stage=validate");
}

#[tokio::test]
async fn unknown_reservoir_is_not_found() {
    let h = harness();
    let (status, body) = get_json(&h.app, "/api/reservoirs/999/latest").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], 2001);

    let (status, _) = get_json(&h.app, "/api/reservoirs/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn single_reservoir_lookup() {
    let h = harness();
    let (status, _) = submit(&h.app, json!([{ "name": "Shardara", "fili": "south" }])).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get_json(&h.app, "/api/reservoirs/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Shardara");
    assert_eq!(body["category"], "south");
}

#[tokio::test]
async fn excel_export_returns_attachment() {
    let h = harness();
    let body = json!({
        "organization": "Kazvodkhoz",
        "date": "2026-10-16",
        "executor": "Operator",
        "waterReservoirs": [{ "name": "Kapchagay", "filling": 82.5, "min_volume": "6.5; 1998" }],
    });
    let Ok(request) = Request::post("/generate-excel")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
    else {
        panic!("bad request");
    };
    let Ok(response) = h.app.clone().oneshot(request).await else {
        panic!("router failed");
    };
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=water_reservoirs_2026-10-16.xlsx"
    );
    let Ok(bytes) = axum::body::to_bytes(response.into_body(), usize::MAX).await else {
        panic!("body read failed");
    };
    assert!(bytes.starts_with(b"PK"));

    // export never writes to the store
    assert_eq!(h.store.status_count().await, 0);
}

#[tokio::test]
async fn excel_export_rejects_non_numeric_cell() {
    let h = harness();
    let (status, _) = post_json(
        &h.app,
        "/generate-excel",
        &json!({
            "organization": "Kazvodkhoz",
            "date": "2026-10-16",
            "executor": "Operator",
            "waterReservoirs": [{ "name": "Kapchagay", "volume": "full" }],
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversized_name_is_a_client_error() {
    let h = harness();
    let (status, body) = submit(&h.app, json!([{ "name": "x".repeat(256), "filling": 1 }])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], 1003);
    assert_eq!(body["error"]["details"], "record=0 stage=resolve");
    assert_eq!(h.store.status_count().await, 0);
}
