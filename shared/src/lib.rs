//! Freshwatch Shared Library
//!
//! This crate contains the target model, the freshness probes, and the
//! storage abstractions used across the Freshwatch exporter and CLI.
//!
//! # Modules
//!
//! - [`models`] - Targets and probe outcomes
//! - [`config`] - YAML targets configuration
//! - [`probes`] - Folder, pattern, file and bucket freshness probes
//! - [`storage`] - Object storage traits and implementations
//!
//! # Example
//!
//! ```
//! use shared::config::TargetsConfig;
//! use shared::models::TargetKind;
//!
//! let config = TargetsConfig::from_yaml_str(
//!     "regex_folders:\n  - path: /data/exports\n    pattern: daily_\n",
//! )
//! .unwrap();
//!
//! let targets = config.targets();
//! assert_eq!(targets[0].kind(), TargetKind::RegexFolder);
//! assert_eq!(targets[0].label_values(), vec!["/data/exports", "daily_"]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod models;
pub mod probes;
pub mod storage;

/// Re-export common dependencies for convenience.
pub use chrono;
pub use serde;
pub use serde_json;
