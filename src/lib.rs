//! Library exports for pushmetrics, shared between the binary and tests.

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod metrics;
pub mod routes;
pub mod startup;
pub mod state;
pub mod utils;
