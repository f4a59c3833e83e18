//! Freshwatch Exporter Binary
//!
//! Entry point for the Freshwatch freshness exporter. Takes no flags: settings
//! come from the environment (or a `.env` file) and targets from `config.yaml`
//! in the working directory unless `FRESHWATCH_CONFIG` says otherwise.

#![deny(unsafe_code)]

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    api::run_server().await
}
