//! HTTP 接入：POST /api/agent 与 GET /api/health
//!
//! 请求体先按原始字节读取再解析，非法 JSON 与非对象一样交给 Sanitizer 拒绝（400）；
//! 规划在 spawn_blocking 中运行，panic 与内部错误统一映射为 500 且不泄露细节。

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::agent::{respond, PlanArtifact};
use crate::config::AgentSection;
use crate::core::AgentError;

/// 路由共享状态
#[derive(Debug, Clone, Default)]
pub struct WebState {
    pub limits: AgentSection,
}

type ApiError = (StatusCode, Json<Value>);

pub fn create_router(state: Arc<WebState>) -> Router {
    Router::new()
        .route("/api/agent", post(api_agent))
        .route("/api/health", get(|| async { "OK" }))
        .with_state(state)
}

/// POST /api/agent - 一轮规划
async fn api_agent(
    State(state): State<Arc<WebState>>,
    body: Bytes,
) -> Result<Json<PlanArtifact>, ApiError> {
    let payload: Value = serde_json::from_slice(&body).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "request body is not valid JSON");
        Value::Null
    });

    let limits = state.limits.clone();
    let outcome = tokio::task::spawn_blocking(move || respond(&payload, &limits))
        .await
        .unwrap_or_else(|e| Err(AgentError::PlannerFailed(e.to_string())));

    outcome.map(Json).map_err(error_response)
}

fn error_response(err: AgentError) -> ApiError {
    let status = if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        tracing::error!(error = %err, "agent request failed");
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(json!({ "error": err.public_message() })))
}
