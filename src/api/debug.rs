//! Introspection API
//!
//! Read and reset access to the capture log, consumed by external test code
//! between cases to assert on routed traffic and to guarantee isolation.
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::json;

use crate::types::AppState;

/// Construct debug routes, to be nested under `/debug`
pub fn get_debug_routes() -> Router<AppState> {
    return Router::new()
        .route("/requests", get(handler_requests))
        .route("/clear", post(handler_clear));
}

/// Full ordered capture log as structured data; non-draining
async fn handler_requests(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.captures.snapshot()))
}

/// Empty the capture log; idempotent
async fn handler_clear(State(state): State<AppState>) -> impl IntoResponse {
    state.captures.clear();
    tracing::debug!("Capture log cleared on {}", state.identity);
    (StatusCode::OK, Json(json!({"status": "cleared"})))
}
