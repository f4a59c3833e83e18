//! Freshwatch Exporter
//!
//! This crate provides the freshness exporter: a scrape scheduler that probes
//! configured folders, files and S3 buckets on a fixed interval, and an HTTP
//! endpoint that serves the resulting gauges in the Prometheus text format.
//!
//! # Architecture
//!
//! The exporter is built on Axum and Tokio, providing:
//! - A background scrape loop writing into a private Prometheus registry
//! - A `/metrics` endpoint reading that registry on every request
//! - A `/health` endpoint for supervisors
//!
//! The two halves share only the gauges; a scrape in progress never delays a
//! metrics request.
//!
//! # Example
//!
//! ```no_run
//! use api::run_server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     run_server().await
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod config;
pub mod metrics;
mod routes;
pub mod scheduler;
mod state;

pub use config::Config;
pub use metrics::FreshnessMetrics;
pub use scheduler::{ScrapeProgress, ScrapeReport, ScrapeScheduler, ScrapeStatus};
pub use state::AppState;

use anyhow::{Context, Result};
use axum::Router;
use shared::config::TargetsConfig;
use shared::storage::{ObjectStore, S3ObjectStore};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

/// Runs the Freshwatch exporter.
///
/// This function reads process settings from environment variables, loads
/// the targets file, and starts serving. It handles graceful shutdown on
/// SIGTERM/SIGINT signals.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration cannot be loaded from environment
/// - The targets file cannot be read or parsed
/// - The server fails to bind to the configured address
/// - A scrape cycle fails
pub async fn run_server() -> Result<()> {
    let config = Config::from_env()?;
    run_server_with_config(config).await
}

/// Runs the Freshwatch exporter with the provided configuration.
///
/// The targets file named by `config` is loaded before anything is served.
///
/// # Errors
///
/// Returns an error if:
/// - The targets file cannot be read or parsed
/// - The server fails to bind to the configured address
/// - A scrape cycle fails
pub async fn run_server_with_config(config: Config) -> Result<()> {
    let targets = TargetsConfig::load(&config.targets_path).with_context(|| {
        format!(
            "Failed to load targets from {}",
            config.targets_path.display()
        )
    })?;

    let store = S3ObjectStore::new_shared().await;
    run_exporter(config, targets, store).await
}

/// Runs the exporter against already loaded targets and a given object store.
///
/// Binds the listener, spawns the scrape scheduler, and serves until a
/// shutdown signal arrives or the scheduler fails, whichever comes first.
///
/// # Errors
///
/// Returns an error if the server fails to bind or serve, or if the
/// scheduler stopped on a failed scrape cycle.
pub async fn run_exporter(
    config: Config,
    targets: TargetsConfig,
    store: Arc<dyn ObjectStore>,
) -> Result<()> {
    let addr = config.socket_addr()?;

    tracing::info!(
        host = %config.host,
        port = %config.port,
        targets = targets.target_count(),
        "Freshwatch exporter starting"
    );

    let metrics = FreshnessMetrics::new().context("Failed to create freshness gauges")?;
    let scheduler = Arc::new(ScrapeScheduler::new(
        Arc::new(targets),
        metrics.clone(),
        store,
        config.scrape_interval,
    ));

    let app = create_router(AppState::new(metrics).with_scrape_status(scheduler.status()));
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(%addr, "Listening for connections");

    let shutdown = CancellationToken::new();
    let scrape_task = tokio::spawn(scheduler.run(shutdown.clone()));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await?;

    shutdown.cancel();
    scrape_task.await.context("Scrape scheduler panicked")??;

    tracing::info!("Exporter shutdown complete");
    Ok(())
}

/// Creates the main application router with all routes and middleware.
///
/// This function is public to allow testing the router without starting a full server.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health_routes(state.clone()))
        .merge(routes::metrics_routes(state))
        .layer(TraceLayer::new_for_http())
}

/// Waits for a shutdown signal (SIGTERM, SIGINT, or the scheduler giving up).
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
        () = shutdown.cancelled() => {
            tracing::warn!("Scrape scheduler stopped, shutting down server");
        }
    }

    shutdown.cancel();
}
