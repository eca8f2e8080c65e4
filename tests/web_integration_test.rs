//! HTTP 集成测试（需 `web` feature）

#![cfg(feature = "web")]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use relay::integrations::web::{create_router, WebState};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> Router {
    create_router(Arc::new(WebState::default()))
}

async fn post_agent(body: impl Into<Body>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/agent")
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health() {
    let request = Request::builder().uri("/api/health").body(Body::empty()).unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn test_empty_message_returns_400() {
    let (status, body) = post_agent(json!({ "message": "  ", "history": [] }).to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Message cannot be empty." }));
}

#[tokio::test]
async fn test_invalid_json_returns_400() {
    let (status, body) = post_agent("{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Message cannot be empty.");
}

#[tokio::test]
async fn test_plan_artifact_shape() {
    let payload = json!({
        "message": "Plan a 30-day go-to-market for a B2B SaaS beta",
        "history": [{ "role": "assistant", "content": "Relay agent online." }]
    });
    let (status, body) = post_agent(payload.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["playbook"], "Go-To-Market");
    for key in ["summary", "reply", "steps", "tasks", "signals", "references"] {
        assert!(body.get(key).is_some(), "missing {}", key);
    }
    let tasks = body["tasks"].as_array().unwrap();
    assert!(tasks.iter().all(|t| t["status"] == "pending"));
    assert!(body["signals"]
        .as_array()
        .unwrap()
        .iter()
        .all(|s| s.get("type").is_some()));
}
