use std::sync::Arc;
use std::time::Instant;

use axum::{
    Json, Router,
    extract::{Request, State, rejection::JsonRejection},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::AppState;
use super::error::ApiResult;

#[derive(Debug, Deserialize)]
struct ComputeRequest {
    #[serde(default)]
    x: f64,
    #[serde(default)]
    y: f64,
}

#[derive(Debug, Serialize)]
struct ComputeResponse {
    x: f64,
    y: f64,
    sum: f64,
    product: f64,
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn compute(
    body: Result<Json<ComputeRequest>, JsonRejection>,
) -> ApiResult<Json<ComputeResponse>> {
    let Json(ComputeRequest { x, y }) = body?;
    Ok(Json(ComputeResponse {
        x,
        y,
        sum: x + y,
        product: x * y,
    }))
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.to_prometheus(),
    )
}

/// Counts every request routed through it and records its latency.
pub async fn track_requests(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let started = Instant::now();
    let response = next.run(request).await;
    state.metrics.observe_request(started.elapsed());
    response
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .route("/compute", post(compute))
}
