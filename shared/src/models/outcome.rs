//! Probe outcome model.
//!
//! Probes report either a measured age in minutes or the absence of any
//! relevant item. The absence is kept as a tagged variant all the way to the
//! gauge write, where it is flattened to [`NO_DATA_SENTINEL`].

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Value written to a gauge when a probe found nothing to measure.
///
/// Elapsed time is never negative, so consumers must read exactly `-1` as
/// "absent" and not as "very fresh".
pub const NO_DATA_SENTINEL: f64 = -1.0;

/// Why a probe produced no measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Absence {
    /// The folder has no entries.
    EmptyFolder,
    /// No entry name matched the pattern.
    NoMatch,
    /// The pattern does not compile.
    InvalidPattern,
    /// The path does not exist or is not a regular file.
    MissingFile,
    /// The bucket holds no objects.
    EmptyBucket,
    /// Credentials are missing or were rejected by the storage service.
    CredentialsRejected,
}

impl fmt::Display for Absence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::EmptyFolder => "folder is empty",
            Self::NoMatch => "no file name matches the pattern",
            Self::InvalidPattern => "pattern does not compile",
            Self::MissingFile => "path is missing or not a regular file",
            Self::EmptyBucket => "bucket is empty",
            Self::CredentialsRejected => "credentials missing or rejected",
        };
        f.write_str(text)
    }
}

/// Result of a single probe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProbeOutcome {
    /// Minutes elapsed since the most recent relevant timestamp.
    Measured {
        /// Elapsed minutes, never negative.
        minutes: f64,
    },
    /// Nothing to measure.
    NoData {
        /// The reason nothing was measured.
        reason: Absence,
    },
}

impl ProbeOutcome {
    /// Creates a measured outcome. Negative inputs are clamped to zero.
    #[must_use]
    pub fn measured(minutes: f64) -> Self {
        Self::Measured {
            minutes: minutes.max(0.0),
        }
    }

    /// Creates an outcome carrying no measurement.
    #[must_use]
    pub fn no_data(reason: Absence) -> Self {
        Self::NoData { reason }
    }

    /// Minutes elapsed from `latest` to `now`.
    ///
    /// A `latest` ahead of `now` (clock skew between hosts, or a file stamped
    /// in the future) yields `0.0`.
    #[must_use]
    pub fn since(latest: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let elapsed = now.signed_duration_since(latest);
        #[allow(clippy::cast_precision_loss)]
        let minutes = elapsed.num_milliseconds() as f64 / 60_000.0;
        Self::measured(minutes)
    }

    /// Minutes elapsed from `latest` to now, or `absent` if there is no timestamp.
    #[must_use]
    pub fn from_latest(latest: Option<DateTime<Utc>>, absent: Absence) -> Self {
        match latest {
            Some(ts) => Self::since(ts, Utc::now()),
            None => Self::no_data(absent),
        }
    }

    /// The value to publish: the elapsed minutes, or [`NO_DATA_SENTINEL`].
    #[must_use]
    pub fn gauge_value(&self) -> f64 {
        match self {
            Self::Measured { minutes } => *minutes,
            Self::NoData { .. } => NO_DATA_SENTINEL,
        }
    }

    /// Returns true if this outcome carries a measurement.
    #[must_use]
    pub fn is_measured(&self) -> bool {
        matches!(self, Self::Measured { .. })
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Measured { minutes } => write!(f, "{minutes:.2} min"),
            Self::NoData { reason } => write!(f, "no data ({reason})"),
        }
    }
}
