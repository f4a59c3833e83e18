//! Scrape scheduler.
//!
//! Runs the probe for every configured target, publishes each result into
//! the freshness gauges, then sleeps for the scrape interval. One cycle at a
//! time: every target of a cycle is evaluated before any is evaluated again.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::config::TargetsConfig;
use shared::probes;
use shared::storage::ObjectStore;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::metrics::FreshnessMetrics;

/// Summary of one scrape cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrapeReport {
    /// Targets that produced a measurement.
    pub measured: usize,
    /// Targets that produced no data.
    pub no_data: usize,
    /// Wall time spent probing.
    pub elapsed: Duration,
}

impl ScrapeReport {
    /// Total number of targets written this cycle.
    #[must_use]
    pub fn total(&self) -> usize {
        self.measured + self.no_data
    }
}

/// Completed cycles as seen from outside the scheduler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScrapeProgress {
    /// Cycles that probed every target.
    pub completed_cycles: u64,
    /// When the most recent complete cycle finished.
    pub last_completed: Option<DateTime<Utc>>,
}

/// Shared handle on the scheduler's [`ScrapeProgress`].
#[derive(Debug, Clone, Default)]
pub struct ScrapeStatus {
    progress: Arc<RwLock<ScrapeProgress>>,
}

impl ScrapeStatus {
    /// Creates a status with no completed cycle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current progress.
    #[must_use]
    pub fn snapshot(&self) -> ScrapeProgress {
        *self
            .progress
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn complete_cycle(&self, at: DateTime<Utc>) {
        let mut progress = self
            .progress
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        progress.completed_cycles += 1;
        progress.last_completed = Some(at);
    }
}

/// Background scheduler for freshness probes.
pub struct ScrapeScheduler {
    targets: Arc<TargetsConfig>,
    metrics: FreshnessMetrics,
    store: Arc<dyn ObjectStore>,
    interval_duration: Duration,
    status: ScrapeStatus,
}

impl ScrapeScheduler {
    /// Creates a new scrape scheduler.
    ///
    /// # Arguments
    ///
    /// * `targets` - Targets configuration, walked in order every cycle
    /// * `metrics` - Gauges the results are written to
    /// * `store` - Object store used by bucket probes
    /// * `interval_duration` - Pause between the end of one cycle and the next
    #[must_use]
    pub fn new(
        targets: Arc<TargetsConfig>,
        metrics: FreshnessMetrics,
        store: Arc<dyn ObjectStore>,
        interval_duration: Duration,
    ) -> Self {
        Self {
            targets,
            metrics,
            store,
            interval_duration,
            status: ScrapeStatus::new(),
        }
    }

    /// Returns a handle on this scheduler's progress.
    #[must_use]
    pub fn status(&self) -> ScrapeStatus {
        self.status.clone()
    }

    /// Runs a single scrape cycle.
    ///
    /// Targets are probed in configuration order and each result is
    /// published as soon as it is known.
    ///
    /// # Errors
    ///
    /// Returns the first probe error. The cycle stops there: targets after
    /// the failing one keep their previous values, targets before it have
    /// already been published, and the cycle does not count as completed.
    pub async fn scrape_once(&self) -> Result<ScrapeReport> {
        let started = Instant::now();
        let mut report = ScrapeReport {
            measured: 0,
            no_data: 0,
            elapsed: Duration::ZERO,
        };

        for target in self.targets.targets() {
            let outcome = probes::probe(self.store.as_ref(), &target)
                .await
                .with_context(|| format!("Probe failed for {target}"))?;

            tracing::debug!(kind = %target.kind(), name = %target, %outcome, "Probed target");
            self.metrics.record(&target, &outcome);

            if outcome.is_measured() {
                report.measured += 1;
            } else {
                report.no_data += 1;
            }
        }

        report.elapsed = started.elapsed();
        self.status.complete_cycle(Utc::now());
        Ok(report)
    }

    /// Starts the scrape loop.
    ///
    /// Scrapes, then sleeps for the configured interval, until `shutdown` is
    /// cancelled. A cancellation during the sleep ends the loop immediately.
    ///
    /// # Errors
    ///
    /// A failing cycle is not retried: the error is logged, `shutdown` is
    /// cancelled so the rest of the process stops too, and the error is
    /// returned. Recovery is left to the process supervisor.
    pub async fn run(self: Arc<Self>, shutdown: CancellationToken) -> Result<()> {
        tracing::info!(
            targets = self.targets.target_count(),
            interval_secs = self.interval_duration.as_secs(),
            "Scrape scheduler started"
        );

        while !shutdown.is_cancelled() {
            match self.scrape_once().await {
                Ok(report) => {
                    tracing::info!(
                        measured = report.measured,
                        no_data = report.no_data,
                        elapsed_ms = u64::try_from(report.elapsed.as_millis()).unwrap_or(u64::MAX),
                        "Scrape cycle complete"
                    );
                }
                Err(e) => {
                    tracing::error!(error = %format!("{e:#}"), "Scrape cycle aborted");
                    shutdown.cancel();
                    return Err(e);
                }
            }

            tokio::select! {
                () = sleep(self.interval_duration) => {}
                () = shutdown.cancelled() => {}
            }
        }

        tracing::info!("Scrape scheduler stopped");
        Ok(())
    }
}
