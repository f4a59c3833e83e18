//! Metrics module.
//!
//! This module owns the freshness gauges published by the exporter.

pub mod registry;

pub use registry::{FreshnessMetrics, CONTENT_TYPE};
