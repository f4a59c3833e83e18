//! Object storage probe.

use super::ProbeError;
use crate::models::{Absence, BucketTarget, ProbeOutcome};
use crate::storage::{ObjectStore, StorageError};

/// Minutes since the newest object in `bucket` was last modified.
///
/// Both the object timestamp and "now" are UTC-aware, so no naive/aware
/// mismatch can creep into the subtraction.
///
/// Returns `NoData(EmptyBucket)` for an empty bucket and
/// `NoData(CredentialsRejected)` when the credential pair is missing or refused.
///
/// # Errors
///
/// Any other storage failure (unreachable service, unknown bucket, access
/// denied) is returned as an error.
pub async fn probe_bucket(
    store: &dyn ObjectStore,
    bucket: &BucketTarget,
) -> Result<ProbeOutcome, ProbeError> {
    match store.latest_modified(bucket).await {
        Ok(latest) => Ok(ProbeOutcome::from_latest(latest, Absence::EmptyBucket)),
        Err(StorageError::CredentialsRejected { .. }) => {
            tracing::debug!(bucket = %bucket.name, "Credentials rejected");
            Ok(ProbeOutcome::no_data(Absence::CredentialsRejected))
        }
        Err(err) => Err(err.into()),
    }
}
