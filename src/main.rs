//! kairos-mock is a single mock KairosDB backend instance used as a routing
//! target when integration-testing a metrics-proxy
//!
use std::net::{IpAddr, SocketAddr};

use axum::{http::StatusCode, response::IntoResponse, routing::get, Router};
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kairos_mock::api;
use kairos_mock::types::AppState;

// Use Jemalloc only for musl-64 bits platforms
#[cfg(all(target_env = "musl", target_pointer_width = "64"))]
#[global_allocator]
static ALLOC: jemallocator::Jemalloc = jemallocator::Jemalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "kairos_mock=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Launch contract: two positional parameters, port and identity
    let mut args = std::env::args().skip(1);
    let (port, identity) = match (args.next(), args.next()) {
        (Some(port), Some(identity)) => (port.parse::<u16>()?, identity),
        _ => anyhow::bail!("Usage: kairos-mock <port> <server_name>"),
    };

    tracing::info!("Starting mock KairosDB server '{}' on port {}", identity, port);

    let app_state = AppState::new(identity);

    // build our application: health probe, the query API and the debug API
    let app = Router::new()
        .route("/health", get(api::v1::handler_health))
        .nest("/api/v1", api::v1::get_v1_routes())
        .nest("/debug", api::debug::get_debug_routes())
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(app_state);

    // add a fallback service for handling routes to unknown paths
    let app = app.fallback(handler_404);

    let addr = SocketAddr::from(("127.0.0.1".parse::<IpAddr>().unwrap(), port));
    tracing::debug!("listening on {}", addr);
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Stopped kairos-mock");
    Ok(())
}

/// Return 404 error
async fn handler_404() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "nothing to see here")
}

/// Shutdown handler for the application
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("signal received, starting graceful shutdown");
}
