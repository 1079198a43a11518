//! Shared application state.

use crate::config::ConfigV1;
use crate::metrics::Metrics;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded at startup.
    pub config: Arc<ConfigV1>,
    /// The metrics component whose registry is exposed on `/metrics`.
    pub metrics: Arc<Metrics>,
}
