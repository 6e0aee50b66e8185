// Test helper functions for driving the mock backend router in-process
//
// Assembles the same router the kairos-mock binary serves and provides
// oneshot-based request helpers returning (status, parsed JSON body).

use axum::{
    body::Body,
    http::{Request, StatusCode},
    routing::get,
    Router,
};
use kairos_mock::{api, types::AppState};
use serde_json::Value;
use tower::ServiceExt;

/// Creates the state of one mock instance with the given identity
pub fn test_state(identity: &str) -> AppState {
    AppState::new(identity)
}

/// Assembles the full application router over the given state
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(api::v1::handler_health))
        .nest("/api/v1", api::v1::get_v1_routes())
        .nest("/debug", api::debug::get_debug_routes())
        .with_state(state)
        .fallback(handler_404)
}

async fn handler_404() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// POST a JSON value to the given path
pub async fn post_json(app: Router, path: &str, body: &Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();
    send(app, request).await
}

/// POST a raw (possibly non-JSON) body to the given path
pub async fn post_raw(app: Router, path: &str, body: &'static str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

/// GET the given path
pub async fn get_path(app: Router, path: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(path).body(Body::empty()).unwrap();
    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = ServiceExt::<Request<Body>>::oneshot(app, request)
        .await
        .unwrap();
    let status = response.status();
    let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
    // Non-JSON bodies (e.g. the 404 fallback) map to Null
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}
