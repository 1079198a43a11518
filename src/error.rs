//! Crate-wide error type.

use thiserror::Error;

/// Errors raised while configuring, starting or stopping the metrics plugin.
#[derive(Debug, Error)]
pub enum Error {
    /// The configuration is not usable. Fatal at startup.
    #[error("config invalid: {0}")]
    InvalidConfig(String),

    /// `serve` was called while a push scheduler is already running.
    #[error("component '{0}' is already serving")]
    AlreadyServing(String),

    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),

    #[error("failed to load configuration: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<figment::Error> for Error {
    fn from(e: figment::Error) -> Self {
        Error::Config(Box::new(e))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
