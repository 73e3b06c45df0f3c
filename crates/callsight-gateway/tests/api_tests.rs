// SPDX-FileCopyrightText: 2026 Callsight Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP surface tests driven through the router without a socket.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use callsight_core::RecordStore;
use callsight_gateway::{AppState, router};
use callsight_pipeline::{InsightExtractor, Pipeline, RetryPolicy};
use callsight_test_utils::{MockProvider, MockRecordStore, MockReply, TestHarness, valid_insight_json};

fn json_post(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/analyze_call")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn mock_pipeline(replies: Vec<MockReply>, store: Arc<MockRecordStore>) -> Arc<Pipeline> {
    let provider = Arc::new(MockProvider::with_replies(replies));
    let policy = RetryPolicy {
        max_retries: 2,
        delay: Duration::ZERO,
        attempt_timeout: Duration::from_secs(5),
    };
    let extractor = InsightExtractor::new(provider, policy).unwrap();
    Arc::new(Pipeline::new(extractor, store))
}

#[tokio::test]
async fn analyze_call_returns_record_id_and_insights() {
    let harness = TestHarness::builder()
        .with_replies(vec![MockReply::text(valid_insight_json(
            "Confirm EMI payment",
            "Positive",
            false,
            "Customer confirmed timely EMI payment.",
        ))])
        .build()
        .await
        .unwrap();
    let app = router(AppState::new(harness.pipeline.clone()));

    let response = app
        .oneshot(json_post(
            r#"{"transcript":"Agent: Hello... EMI due tomorrow. Customer: I will pay on time."}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["record_id"], 1);
    assert_eq!(json["insights"]["customer_intent"], "Confirm EMI payment");
    assert_eq!(json["insights"]["sentiment"], "positive");
    assert_eq!(json["insights"]["action_required"], false);
    assert_eq!(harness.store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn blank_transcript_is_422_with_detail() {
    let store = Arc::new(MockRecordStore::new());
    let app = router(AppState::new(mock_pipeline(vec![], store.clone())));

    let response = app.oneshot(json_post(r#"{"transcript":"   "}"#)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert!(
        json["detail"].as_str().unwrap().contains("empty"),
        "got: {json}"
    );
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn missing_transcript_field_is_422() {
    let app = router(AppState::new(mock_pipeline(
        vec![],
        Arc::new(MockRecordStore::new()),
    )));

    let response = app.oneshot(json_post(r#"{"text":"hello"}"#)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert!(json["detail"].as_str().unwrap().contains("transcript"), "got: {json}");
}

#[tokio::test]
async fn exhausted_retries_are_502() {
    let store = Arc::new(MockRecordStore::new());
    let replies = vec![
        MockReply::error("unavailable"),
        MockReply::error("unavailable"),
        MockReply::error("unavailable"),
    ];
    let app = router(AppState::new(mock_pipeline(replies, store.clone())));

    let response = app
        .oneshot(json_post(r#"{"transcript":"Customer: kal pay karunga"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(response).await;
    assert!(json["detail"].as_str().unwrap().contains("3 attempt"), "got: {json}");
    assert!(store.records().await.is_empty());
}

#[tokio::test]
async fn store_failure_is_503() {
    let app = router(AppState::new(mock_pipeline(
        vec![],
        Arc::new(MockRecordStore::failing()),
    )));

    let response = app
        .oneshot(json_post(r#"{"transcript":"Agent: Hello"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_json(response).await;
    assert!(json["detail"].as_str().unwrap().contains("persistence"), "got: {json}");
}

#[tokio::test]
async fn root_reports_ok_with_timestamp() {
    let app = router(AppState::new(mock_pipeline(
        vec![],
        Arc::new(MockRecordStore::new()),
    )));

    let response = app.oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    let timestamp = json["timestamp"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok(), "got: {timestamp}");
}

#[tokio::test]
async fn health_follows_store_state() {
    let store = Arc::new(MockRecordStore::new());
    let app = router(AppState::new(mock_pipeline(vec![], store.clone())));

    let response = app.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "healthy");

    store.close().await.unwrap();
    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_json(response).await;
    assert_eq!(json["status"], "unhealthy");
    assert_eq!(json["detail"], "store closed");
}

#[tokio::test]
async fn sqlite_store_reports_healthy() {
    let harness = TestHarness::builder().build().await.unwrap();
    let app = router(AppState::new(harness.pipeline.clone()));

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
