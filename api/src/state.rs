//! Application state module.
//!
//! Defines the shared application state that is passed to route handlers.

use crate::metrics::FreshnessMetrics;
use crate::scheduler::ScrapeStatus;

/// Application state shared across all request handlers.
///
/// Handlers only ever read the gauges; the scrape scheduler holds a clone of
/// the same [`FreshnessMetrics`] and writes to it.
#[derive(Clone)]
pub struct AppState {
    /// The freshness gauges.
    metrics: FreshnessMetrics,
    /// Progress of the scrape loop feeding the gauges.
    scrape_status: ScrapeStatus,
}

impl AppState {
    /// Creates a new application state around the given gauges.
    ///
    /// The scrape status starts detached; use [`AppState::with_scrape_status`]
    /// to follow a running scheduler.
    #[must_use]
    pub fn new(metrics: FreshnessMetrics) -> Self {
        Self {
            metrics,
            scrape_status: ScrapeStatus::new(),
        }
    }

    /// Follows the given scheduler status instead of a detached one.
    #[must_use]
    pub fn with_scrape_status(mut self, scrape_status: ScrapeStatus) -> Self {
        self.scrape_status = scrape_status;
        self
    }

    /// Returns a reference to the freshness gauges.
    #[must_use]
    pub fn metrics(&self) -> &FreshnessMetrics {
        &self.metrics
    }

    /// Returns a reference to the scrape status.
    #[must_use]
    pub fn scrape_status(&self) -> &ScrapeStatus {
        &self.scrape_status
    }
}
