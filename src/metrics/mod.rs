//! Metrics exposition and push-gateway support for Prometheus.
//!
//! This module provides the metrics component, its configuration and
//! the background push scheduler.

mod config;
mod plugin;
pub mod pusher;

pub use config::{MetricsConfig, DEFAULT_PUSH_INTERVAL_SECS, MAX_PUSH_INTERVAL_SECS};
pub use plugin::Metrics;
