//! KairosDB-compatible query API
//!
//! The minimal surface a metrics-proxy expects from a KairosDB backend:
//! health check plus the two datapoints query endpoints. Every successfully
//! parsed query request is captured before a deterministic fixture response
//! is synthesized, so external assertions can replay exactly what arrived.
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::post,
    Router,
};
use serde_json::{json, Value};

use crate::types::{metric_names, AppState, CapturedRequest, Endpoint, QueryResponse, TagsResponse};

/// Construct supported api v1 routes, to be nested under `/api/v1`
pub fn get_v1_routes() -> Router<AppState> {
    return Router::new()
        .route("/datapoints/query", post(handler_query))
        .route("/datapoints/query/tags", post(handler_query_tags));
}

/// Liveness probe; reports the serving identity, never touches the capture log
pub async fn handler_health(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({"status": "ok", "server": state.identity})),
    )
}

/// Handler method invoked for /api/v1/datapoints/query requests
pub async fn handler_query(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    capture_and_respond(Endpoint::QueryData, state, headers, body)
}

/// Handler method invoked for /api/v1/datapoints/query/tags requests
pub async fn handler_query_tags(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    capture_and_respond(Endpoint::QueryTags, state, headers, body)
}

/// Shared capture-then-synthesize contract of both query endpoints.
///
/// The body is parsed as opaque JSON; a parse failure is the failure boundary
/// (400 with a diagnostic, nothing captured). On success the verbatim payload
/// goes into the capture log before the per-endpoint fixture is built.
fn capture_and_respond(
    endpoint: Endpoint,
    state: AppState,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let payload: Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(error) => {
            tracing::debug!(
                "Rejecting unparseable body on {}: {}",
                endpoint.path(),
                error
            );
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": format!("{}", error) })),
            )
                .into_response();
        }
    };

    state.captures.append(CapturedRequest::new(
        endpoint,
        payload.clone(),
        &state.identity,
        &headers,
    ));

    let names = metric_names(&payload);
    tracing::debug!(
        "Serving {} metric(s) on {} as {}",
        names.len(),
        endpoint.path(),
        state.identity
    );
    match endpoint {
        Endpoint::QueryData => (
            StatusCode::OK,
            Json(QueryResponse::for_metrics(&names, &state.identity)),
        )
            .into_response(),
        Endpoint::QueryTags => (
            StatusCode::OK,
            Json(TagsResponse::for_metrics(&names, &state.identity)),
        )
            .into_response(),
    }
}
