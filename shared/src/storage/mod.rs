//! Storage traits and implementations.
//!
//! This module provides abstractions over object storage. The `ObjectStore`
//! trait answers "when did the newest object land in this bucket", allowing
//! different implementations (S3, in-memory, etc.).

pub mod object_store;

pub use object_store::{InMemoryObjectStore, ObjectStore, S3ObjectStore, StorageError};
