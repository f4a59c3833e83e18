//! Freshness probes.
//!
//! Each probe answers "how many minutes since the most recent relevant item
//! appeared" for one kind of target. Benign absence (nothing there, pattern
//! matches nothing, credentials refused) is an `Ok(ProbeOutcome::NoData)`;
//! misconfiguration and infrastructure failures are a [`ProbeError`] and are
//! never folded into the sentinel.

mod bucket;
mod filesystem;

pub use bucket::probe_bucket;
pub use filesystem::{probe_file, probe_folder, probe_regex_folder};

use thiserror::Error;

use crate::models::{ProbeOutcome, Target};
use crate::storage::{ObjectStore, StorageError};

/// Errors that abort a probe.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The folder could not be listed.
    #[error("Failed to list folder {path}: {source}")]
    ListFolder {
        /// Folder path.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Metadata of an entry could not be read.
    #[error("Failed to read metadata of {path}: {source}")]
    Metadata {
        /// Entry path.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The object store failed for a reason other than credentials.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A blocking filesystem probe panicked or was cancelled.
    #[error("Probe task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Runs the probe matching `target`.
///
/// Filesystem probes run on the blocking thread pool; the bucket probe runs
/// against `store`.
///
/// # Errors
///
/// Returns whatever error the underlying probe returns.
pub async fn probe(store: &dyn ObjectStore, target: &Target) -> Result<ProbeOutcome, ProbeError> {
    match target {
        Target::Folder(folder) => {
            let path = folder.path.clone();
            tokio::task::spawn_blocking(move || probe_folder(&path)).await?
        }
        Target::RegexFolder(folder) => {
            let path = folder.path.clone();
            let pattern = folder.pattern.clone();
            tokio::task::spawn_blocking(move || probe_regex_folder(&path, &pattern)).await?
        }
        Target::File(file) => {
            let path = file.path.clone();
            tokio::task::spawn_blocking(move || probe_file(&path)).await?
        }
        Target::Bucket(bucket) => probe_bucket(store, bucket).await,
    }
}
