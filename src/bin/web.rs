//! Relay Web 服务
//!
//! 启动: cargo run --bin relay-web --features web
//! 请求: curl -X POST http://127.0.0.1:3000/api/agent -d '{"message":"Plan a launch","history":[]}'

use std::sync::Arc;

use anyhow::Context;
use relay::config::load_config_or_default;
use relay::integrations::web::{create_router, WebState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    relay::observability::init();

    let cfg = load_config_or_default(None);
    let state = Arc::new(WebState {
        limits: cfg.agent.clone(),
    });
    let app = create_router(state);

    let addr = format!("{}:{}", cfg.web.host, cfg.web.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("{} web listening on http://{}", cfg.app.display_name(), addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
