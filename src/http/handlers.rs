//! Route handlers.

use axum::extract::State;
use axum::http::{header, Method as HttpMethod, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::Instrument;

use crate::http::server::AppState;
use crate::pipeline::{Method, Request};

/// `ANY /sort`: run one request through the lifecycle.
///
/// The lifecycle is CPU-bound, so it runs on the blocking pool with the
/// current span carried across.
pub async fn sort(State(state): State<AppState>, method: HttpMethod) -> Response {
    let request = Request::arrived_now(Method::from(&method));
    let id = request.id();
    let lifecycle = state.lifecycle.clone();
    let parent = tracing::Span::current();

    let task = tokio::task::spawn_blocking(move || parent.in_scope(|| lifecycle.handle(&request)));
    match task.in_current_span().await {
        Ok(outcome) => outcome.into_response(),
        Err(e) => {
            tracing::error!(requestID = %id, error = %e, "Sort task failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// `GET /health`.
pub async fn health() -> impl IntoResponse {
    tracing::info!("Health check request received");
    Json(json!({ "status": "healthy" }))
}

/// `GET /metrics`: Prometheus text exposition.
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.emitter.render_metrics(),
    )
}
