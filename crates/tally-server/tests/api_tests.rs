//! Integration tests for the chart API endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. A real chart driver runs against an in-memory
//! store on paused tokio time, so every write travels the full path:
//! handler, store, change stream, reconcile, published frame.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use rust_decimal::Decimal;
use serde_json::Value;
use tally_core::config::ChartConfig;
use tally_core::{FrameSink, MemoryStore, TallyConfig, run_chart};
use tally_core::frame::Frame;
use tally_server::router::build_router;
use tally_server::state::AppState;
use tally_types::{NewRecord, Record, RecordId};
use tokio::sync::mpsc;
use tower::ServiceExt;

struct StateSink(Arc<AppState>);

impl FrameSink for StateSink {
    fn on_frame(&mut self, frame: &Frame, records: &[Record]) {
        self.0.publish(frame, records);
    }
}

async fn make_test_state() -> (Arc<AppState>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    store
        .insert_with_id(Record::new("rent", "rent", Decimal::new(500, 0)))
        .unwrap();
    store
        .insert_with_id(Record::new("food", "food", Decimal::new(300, 0)))
        .unwrap();

    let (tx, rx) = mpsc::channel(16);
    let state = Arc::new(AppState::new(
        Arc::clone(&store),
        tx,
        ChartConfig::default(),
    ));

    let sink_state = Arc::clone(&state);
    let driver_store = Arc::clone(&store);
    tokio::spawn(async move {
        let mut sink = StateSink(sink_state);
        run_chart(driver_store, &TallyConfig::default(), rx, &mut sink).await
    });

    settle().await;
    (state, store)
}

/// Let the driver apply pending changes and finish every transition.
async fn settle() {
    tokio::time::sleep(Duration::from_secs(1)).await;
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn get_json(state: &Arc<AppState>, uri: &str) -> Value {
    let response = build_router(Arc::clone(state))
        .oneshot(empty_request("GET", uri))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_to_json(response.into_body()).await
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_index_returns_html() {
    let (state, _store) = make_test_state().await;

    let response = build_router(state)
        .oneshot(empty_request("GET", "/"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_to_string(response.into_body()).await;
    assert!(html.contains("expense-form"));
    assert!(html.contains("<svg"));
    assert!(html.contains("class=\"arc\""));
    assert!(!html.contains("{{chart}}"));
}

#[tokio::test(start_paused = true)]
async fn test_chart_svg() {
    let (state, _store) = make_test_state().await;

    let response = build_router(state)
        .oneshot(empty_request("GET", "/chart.svg"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "image/svg+xml"
    );
    let svg = body_to_string(response.into_body()).await;
    assert_eq!(svg.matches("<path").count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_list_expenses() {
    let (state, _store) = make_test_state().await;

    let json = get_json(&state, "/api/expenses").await;
    assert_eq!(json["count"], 2);
    assert_eq!(json["expenses"][0]["name"], "rent");
    assert_eq!(json["expenses"][0]["cost"], "500");
}

#[tokio::test(start_paused = true)]
async fn test_get_frame() {
    let (state, _store) = make_test_state().await;

    let json = get_json(&state, "/api/frame").await;
    assert!(json["sequence"].as_u64().unwrap() > 1);
    assert_eq!(json["shapes"].as_array().unwrap().len(), 2);
    assert_eq!(json["shapes"][0]["phase"], "present");
    assert_eq!(json["shapes"][0]["fill"], "#8dd3c7");
}

#[tokio::test(start_paused = true)]
async fn test_create_expense() {
    let (state, store) = make_test_state().await;

    let response = build_router(Arc::clone(&state))
        .oneshot(json_request(
            "POST",
            "/api/expenses",
            &serde_json::json!({ "name": "travel", "cost": "200" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_to_json(response.into_body()).await;
    assert!(json["id"].is_string());
    assert_eq!(store.len(), 3);

    settle().await;
    let list = get_json(&state, "/api/expenses").await;
    assert_eq!(list["count"], 3);
    assert_eq!(list["expenses"][2]["name"], "travel");
}

#[tokio::test(start_paused = true)]
async fn test_create_expense_blank_is_rejected() {
    let (state, store) = make_test_state().await;

    let response = build_router(state)
        .oneshot(json_request(
            "POST",
            "/api/expenses",
            &serde_json::json!({ "name": "", "cost": "" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["error"], "Please enter the value before submitting");
    assert_eq!(json["status"], 400);
    assert_eq!(store.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_create_expense_bad_cost_is_rejected() {
    let (state, _store) = make_test_state().await;

    let response = build_router(state)
        .oneshot(json_request(
            "POST",
            "/api/expenses",
            &serde_json::json!({ "name": "rent", "cost": "lots" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test(start_paused = true)]
async fn test_update_expense() {
    let (state, _store) = make_test_state().await;

    let response = build_router(Arc::clone(&state))
        .oneshot(json_request(
            "PUT",
            "/api/expenses/food",
            &serde_json::json!({ "name": "food", "cost": "650" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    settle().await;
    let list = get_json(&state, "/api/expenses").await;
    assert_eq!(list["expenses"][1]["cost"], "650");
    let frame = get_json(&state, "/api/frame").await;
    assert_eq!(frame["shapes"].as_array().unwrap().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_update_unknown_expense_is_404() {
    let (state, _store) = make_test_state().await;

    let response = build_router(state)
        .oneshot(json_request(
            "PUT",
            "/api/expenses/nope",
            &serde_json::json!({ "name": "x", "cost": "1" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], 404);
}

#[tokio::test(start_paused = true)]
async fn test_delete_expense() {
    let (state, store) = make_test_state().await;

    let response = build_router(Arc::clone(&state))
        .oneshot(empty_request("DELETE", "/api/expenses/rent"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(store.len(), 1);

    settle().await;
    let list = get_json(&state, "/api/expenses").await;
    assert_eq!(list["count"], 1);
    let frame = get_json(&state, "/api/frame").await;
    assert_eq!(frame["shapes"].as_array().unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_hover_enter_and_exit() {
    let (state, _store) = make_test_state().await;

    let response = build_router(Arc::clone(&state))
        .oneshot(empty_request("POST", "/api/arcs/rent/hover"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["label"], "rent: 500");
    assert_eq!(json["tooltip"]["name"], "rent");

    settle().await;
    let frame = get_json(&state, "/api/frame").await;
    assert_eq!(frame["shapes"][0]["highlighted"], true);
    assert_eq!(frame["shapes"][0]["fill"], "#fff");

    let response = build_router(Arc::clone(&state))
        .oneshot(empty_request("DELETE", "/api/arcs/rent/hover"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    settle().await;
    let frame = get_json(&state, "/api/frame").await;
    assert_eq!(frame["shapes"][0]["highlighted"], false);
}

#[tokio::test(start_paused = true)]
async fn test_hover_unknown_arc_is_404() {
    let (state, _store) = make_test_state().await;

    let response = build_router(state)
        .oneshot(empty_request("POST", "/api/arcs/nope/hover"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test(start_paused = true)]
async fn test_click_deletes_after_store_confirms() {
    let (state, store) = make_test_state().await;

    let response = build_router(Arc::clone(&state))
        .oneshot(empty_request("POST", "/api/arcs/food/click"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    settle().await;
    assert_eq!(store.len(), 1);
    let frame = get_json(&state, "/api/frame").await;
    let shapes = frame["shapes"].as_array().unwrap();
    assert_eq!(shapes.len(), 1);
    assert_eq!(shapes[0]["record_id"], "rent");
}

#[tokio::test(start_paused = true)]
async fn test_view_stays_current_under_readers_until_idle() {
    let (state, _store) = make_test_state().await;

    // Mirror the page script: every broadcast frame triggers a chart fetch.
    let mut rx = state.subscribe();
    let reader_state = Arc::clone(&state);
    let reader = tokio::spawn(async move {
        let mut seen = 0_u32;
        loop {
            let frame = match tokio::time::timeout(Duration::from_secs(2), rx.recv()).await {
                Ok(Ok(frame)) => frame,
                Ok(Err(tokio::sync::broadcast::error::RecvError::Lagged(_))) => continue,
                Ok(Err(_)) | Err(_) => break,
            };
            assert!(reader_state.view.borrow().frame.sequence >= frame.sequence);
            let response = build_router(Arc::clone(&reader_state))
                .oneshot(empty_request("GET", "/chart.svg"))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            seen += 1;
        }
        seen
    });

    let response = build_router(Arc::clone(&state))
        .oneshot(json_request(
            "POST",
            "/api/expenses",
            &serde_json::json!({ "name": "travel", "cost": "200" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let seen = reader.await.unwrap();
    assert!(seen > 1);

    // The chart has been idle for two seconds; the view must hold the
    // settled frame, not whatever was current while readers were busy.
    tokio::time::sleep(Duration::from_secs(10)).await;
    let list = get_json(&state, "/api/expenses").await;
    assert_eq!(list["count"], 3);
    let frame = get_json(&state, "/api/frame").await;
    let shapes = frame["shapes"].as_array().unwrap();
    assert_eq!(shapes.len(), 3);
    assert!(shapes.iter().all(|s| s["phase"] == "present"));
    let svg = body_to_string(
        build_router(Arc::clone(&state))
            .oneshot(empty_request("GET", "/chart.svg"))
            .await
            .unwrap()
            .into_body(),
    )
    .await;
    assert_eq!(svg.matches("<path").count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_broadcast_frame_is_already_in_view() {
    let (state, store) = make_test_state().await;
    let mut rx = state.subscribe();

    store
        .modify(
            &RecordId::from("food"),
            NewRecord {
                name: "food".into(),
                cost: Decimal::new(900, 0),
            },
        )
        .unwrap();

    let frame = rx.recv().await.unwrap();
    let view = state.view.borrow().clone();
    assert_eq!(view.frame.sequence, frame.sequence);
    assert_eq!(view.records[1].cost, Decimal::new(900, 0));
    assert!(view.svg.contains(&format!("data-frame=\"{}\"", frame.sequence)));
}
