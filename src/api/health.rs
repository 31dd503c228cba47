/// Health check endpoints
///
/// Liveness only says the process answers; readiness also probes the data
/// store within the feed fetch timeout.
use crate::context::AppContext;
use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use std::time::Instant;

/// Build health check routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/health", get(health_basic))
        .route("/health/live", get(liveness_probe))
        .route("/health/ready", get(readiness_probe))
}

/// Basic health check
pub async fn health_basic() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub async fn liveness_probe() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "alive",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Returns 503 when the store cannot answer a lookup in time
pub async fn readiness_probe(
    State(ctx): State<AppContext>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let start = Instant::now();
    let probe = tokio::time::timeout(
        ctx.config.feed.fetch_timeout(),
        ctx.store.get_user("__readiness_probe__"),
    )
    .await;

    match probe {
        Ok(Ok(_)) => Ok(Json(serde_json::json!({
            "status": "ready",
            "version": env!("CARGO_PKG_VERSION"),
            "storeResponseMs": start.elapsed().as_millis() as u64
        }))),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "readiness_probe_failed: store lookup failed");
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
        Err(_) => {
            tracing::warn!("readiness_probe_failed: store lookup timed out");
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}
