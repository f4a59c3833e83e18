//! Exporter configuration module.
//!
//! Handles loading process settings from environment variables with sensible
//! defaults. The watched targets live in a separate YAML file whose path is
//! one of these settings.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Default port of the metrics endpoint.
pub const DEFAULT_PORT: u16 = 8000;

/// Default targets file, relative to the working directory.
pub const DEFAULT_TARGETS_PATH: &str = "config.yaml";

/// Default pause between scrape cycles.
pub const DEFAULT_SCRAPE_INTERVAL: Duration = Duration::from_secs(60);

/// Exporter configuration.
///
/// Configuration values can be set via environment variables:
/// - `FRESHWATCH_HOST`: The host address to bind to (default: "0.0.0.0")
/// - `FRESHWATCH_PORT`: The port to listen on (default: 8000)
/// - `FRESHWATCH_CONFIG`: Path of the targets file (default: "config.yaml")
/// - `FRESHWATCH_SCRAPE_INTERVAL_SECS`: Seconds between scrape cycles (default: 60)
#[derive(Debug, Clone)]
pub struct Config {
    /// The host address to bind to.
    pub host: String,
    /// The port to listen on.
    pub port: u16,
    /// Path of the YAML targets file.
    pub targets_path: PathBuf,
    /// Pause between the end of one scrape cycle and the start of the next.
    pub scrape_interval: Duration,
}

impl Config {
    /// Creates a new configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `FRESHWATCH_PORT` is set but cannot be parsed as a valid port number
    /// - `FRESHWATCH_SCRAPE_INTERVAL_SECS` is set but is not a positive integer
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("FRESHWATCH_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = std::env::var("FRESHWATCH_PORT")
            .ok()
            .map(|p| p.parse::<u16>())
            .transpose()
            .context("FRESHWATCH_PORT is not a valid port")?
            .unwrap_or(DEFAULT_PORT);

        let targets_path = std::env::var("FRESHWATCH_CONFIG")
            .map_or_else(|_| PathBuf::from(DEFAULT_TARGETS_PATH), PathBuf::from);

        let scrape_interval = std::env::var("FRESHWATCH_SCRAPE_INTERVAL_SECS")
            .ok()
            .map(|s| s.parse::<u64>())
            .transpose()
            .context("FRESHWATCH_SCRAPE_INTERVAL_SECS is not a number")?
            .map_or(DEFAULT_SCRAPE_INTERVAL, Duration::from_secs);

        anyhow::ensure!(
            !scrape_interval.is_zero(),
            "FRESHWATCH_SCRAPE_INTERVAL_SECS must be greater than zero"
        );

        Ok(Self {
            host,
            port,
            targets_path,
            scrape_interval,
        })
    }

    /// Returns the socket address for binding.
    ///
    /// # Errors
    ///
    /// Returns an error if the host and port combination is not a valid socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid listen address {}:{}", self.host, self.port))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            targets_path: PathBuf::from(DEFAULT_TARGETS_PATH),
            scrape_interval: DEFAULT_SCRAPE_INTERVAL,
        }
    }
}
