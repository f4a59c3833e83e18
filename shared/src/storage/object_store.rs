//! Object storage trait and implementations.
//!
//! Provides the `ObjectStore` trait for looking up the newest object in a
//! bucket, an `S3ObjectStore` backed by the AWS SDK, and an
//! `InMemoryObjectStore` for development and testing.

use async_trait::async_trait;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::sync::{Arc, RwLock};
use thiserror::Error;

use crate::models::BucketTarget;

/// Service error codes that mean the credential pair itself was refused.
const CREDENTIAL_ERROR_CODES: &[&str] = &[
    "InvalidAccessKeyId",
    "SignatureDoesNotMatch",
    "InvalidToken",
    "ExpiredToken",
];

/// Region used when neither the target nor the environment names one.
const FALLBACK_REGION: &str = "us-east-1";

/// Errors that can occur during object store operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Credentials are missing or were refused by the service.
    #[error("Credentials rejected for bucket {bucket}")]
    CredentialsRejected {
        /// The bucket being listed.
        bucket: String,
    },

    /// Any other failure: network, missing bucket, permissions.
    #[error("Failed to list bucket {bucket}: {message}")]
    Service {
        /// The bucket being listed.
        bucket: String,
        /// Description of the failure.
        message: String,
    },

    /// Failed to acquire lock on the store.
    #[error("Failed to acquire lock on object store")]
    LockError,
}

/// Trait for object store implementations.
///
/// Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Returns the newest last-modified timestamp across every object in the
    /// bucket, or `None` if the bucket is empty.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::CredentialsRejected`] if the credential pair is
    /// blank or refused, and [`StorageError::Service`] for any other failure.
    async fn latest_modified(
        &self,
        bucket: &BucketTarget,
    ) -> Result<Option<DateTime<Utc>>, StorageError>;
}

/// S3-backed object store.
///
/// Holds the ambient AWS configuration (region, endpoint, retry settings)
/// loaded once; each bucket gets a client carrying its own credential pair.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    base: SdkConfig,
}

impl S3ObjectStore {
    /// Creates a store from an already loaded AWS configuration.
    #[must_use]
    pub fn new(base: SdkConfig) -> Self {
        Self { base }
    }

    /// Creates a store from the ambient AWS environment.
    pub async fn from_env() -> Self {
        Self::new(aws_config::defaults(BehaviorVersion::latest()).load().await)
    }

    /// Creates a new S3 object store wrapped in an Arc.
    pub async fn new_shared() -> Arc<Self> {
        Arc::new(Self::from_env().await)
    }

    fn client_for(&self, bucket: &BucketTarget) -> aws_sdk_s3::Client {
        let credentials = Credentials::new(
            bucket.aws_access_key_id.clone(),
            bucket.aws_secret_access_key.clone(),
            None,
            None,
            "freshwatch-targets",
        );

        let mut builder =
            aws_sdk_s3::config::Builder::from(&self.base).credentials_provider(credentials);

        if let Some(region) = &bucket.region {
            builder = builder.region(Region::new(region.clone()));
        } else if self.base.region().is_none() {
            builder = builder.region(Region::new(FALLBACK_REGION));
        }

        if let Some(endpoint) = &bucket.endpoint_url {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        aws_sdk_s3::Client::from_conf(builder.build())
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn latest_modified(
        &self,
        bucket: &BucketTarget,
    ) -> Result<Option<DateTime<Utc>>, StorageError> {
        if bucket.has_blank_credentials() {
            return Err(StorageError::CredentialsRejected {
                bucket: bucket.name.clone(),
            });
        }

        let client = self.client_for(bucket);
        let mut pages = client
            .list_objects_v2()
            .bucket(&bucket.name)
            .into_paginator()
            .send();

        let mut latest: Option<DateTime<Utc>> = None;
        let mut objects = 0usize;

        while let Some(page) = pages.next().await {
            let page = page.map_err(|err| classify_sdk_error(&bucket.name, &err))?;
            for object in page.contents() {
                objects += 1;
                let modified = object
                    .last_modified()
                    .and_then(|ts| DateTime::from_timestamp(ts.secs(), ts.subsec_nanos()));
                latest = latest.max(modified);
            }
        }

        tracing::debug!(bucket = %bucket.name, objects, ?latest, "Listed bucket");
        Ok(latest)
    }
}

fn classify_sdk_error<E, R>(bucket: &str, err: &SdkError<E, R>) -> StorageError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: Debug,
{
    match err.code() {
        Some(code) if CREDENTIAL_ERROR_CODES.contains(&code) => StorageError::CredentialsRejected {
            bucket: bucket.to_string(),
        },
        _ => StorageError::Service {
            bucket: bucket.to_string(),
            message: DisplayErrorContext(err).to_string(),
        },
    }
}

/// In-memory object store implementation.
///
/// Buckets exist once created or written to. Access keys can be marked as
/// rejected and buckets as failing to exercise both error classes.
#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    buckets: RwLock<HashMap<String, Vec<DateTime<Utc>>>>,
    rejected_keys: RwLock<HashSet<String>>,
    failing: RwLock<HashSet<String>>,
}

impl InMemoryObjectStore {
    /// Creates a new empty in-memory object store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory object store wrapped in an Arc.
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Creates an empty bucket.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock cannot be acquired.
    pub fn create_bucket(&self, bucket: &str) -> Result<(), StorageError> {
        let mut buckets = self.buckets.write().map_err(|_| StorageError::LockError)?;
        buckets.entry(bucket.to_string()).or_default();
        Ok(())
    }

    /// Adds an object with the given last-modified time, creating the bucket if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock cannot be acquired.
    pub fn put_object(&self, bucket: &str, last_modified: DateTime<Utc>) -> Result<(), StorageError> {
        let mut buckets = self.buckets.write().map_err(|_| StorageError::LockError)?;
        buckets
            .entry(bucket.to_string())
            .or_default()
            .push(last_modified);
        Ok(())
    }

    /// Makes every request signed with `access_key_id` fail as rejected credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock cannot be acquired.
    pub fn reject_access_key(&self, access_key_id: &str) -> Result<(), StorageError> {
        let mut rejected = self
            .rejected_keys
            .write()
            .map_err(|_| StorageError::LockError)?;
        rejected.insert(access_key_id.to_string());
        Ok(())
    }

    /// Makes every listing of `bucket` fail with a service error.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock cannot be acquired.
    pub fn fail_bucket(&self, bucket: &str) -> Result<(), StorageError> {
        let mut failing = self.failing.write().map_err(|_| StorageError::LockError)?;
        failing.insert(bucket.to_string());
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn latest_modified(
        &self,
        bucket: &BucketTarget,
    ) -> Result<Option<DateTime<Utc>>, StorageError> {
        let rejected = self
            .rejected_keys
            .read()
            .map_err(|_| StorageError::LockError)?
            .contains(&bucket.aws_access_key_id);
        if bucket.has_blank_credentials() || rejected {
            return Err(StorageError::CredentialsRejected {
                bucket: bucket.name.clone(),
            });
        }

        let failing = self
            .failing
            .read()
            .map_err(|_| StorageError::LockError)?
            .contains(&bucket.name);
        if failing {
            return Err(StorageError::Service {
                bucket: bucket.name.clone(),
                message: "service unavailable".to_string(),
            });
        }

        let buckets = self.buckets.read().map_err(|_| StorageError::LockError)?;
        match buckets.get(&bucket.name) {
            Some(objects) => Ok(objects.iter().max().copied()),
            None => Err(StorageError::Service {
                bucket: bucket.name.clone(),
                message: "NoSuchBucket: the specified bucket does not exist".to_string(),
            }),
        }
    }
}
