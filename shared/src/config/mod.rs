//! Configuration module for Freshwatch.
//!
//! This module contains the targets configuration read from YAML at startup.

pub mod targets;

pub use targets::{ConfigError, TargetsConfig};
