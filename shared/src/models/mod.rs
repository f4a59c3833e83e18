//! Data models for Freshwatch.
//!
//! This module contains the core data structures for watched targets and the
//! outcomes their probes produce.

pub mod outcome;
pub mod target;

pub use outcome::{Absence, ProbeOutcome, NO_DATA_SENTINEL};
pub use target::{BucketTarget, FileTarget, FolderTarget, RegexFolderTarget, Target, TargetKind};
