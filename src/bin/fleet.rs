//! kairos-mock-fleet - mock backend fleet orchestrator.
//!
//! Brings up the configured set of mock KairosDB instances, waits until every
//! one of them is healthy and keeps them supervised until interrupted.
//!
#![doc(html_no_source)]

use kairos_mock::config::Config;
use kairos_mock::fleet::Fleet;

use std::path::Path;

use tokio::signal;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    //Enable logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting kairos-mock-fleet");

    // Parse config; without a config file the fixed default fleet is used
    let config_file =
        std::env::var("KM_CONFIG").unwrap_or_else(|_| "config.yaml".to_string());
    let config = if Path::new(&config_file).exists() {
        Config::new(&config_file).map_err(|e| anyhow::anyhow!("Cannot load {}: {}", config_file, e))?
    } else {
        tracing::debug!("No {} found, using default fleet", config_file);
        Config::default()
    };

    let fleet = Fleet::launch(&config.fleet).await?;

    tracing::info!("Mock servers are running until interrupted");
    fleet.run(shutdown_signal()).await?;

    tracing::info!("Stopped kairos-mock-fleet");
    Ok(())
}

/// Resolves on SIGINT or SIGTERM; passed into the fleet run loop as its
/// cancellation trigger
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
}
