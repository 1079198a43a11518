//! Application startup and server initialization.
//!
//! This module configures the metrics component, starts its push loop,
//! serves the HTTP routes and tears everything down on shutdown signals.

use prometheus::Registry;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::config::ConfigV1;
use crate::error::{Error, Result};
use crate::lifecycle::{configure, App, Component};
use crate::metrics::Metrics;
use crate::routes;
use crate::state::AppState;

/// Builds the metrics component from the configuration on top of `registry`.
///
/// Runs the configuration hooks and registers the build info and, on Linux,
/// the process collector.
///
/// # Errors
///
/// Returns [`crate::error::Error::InvalidConfig`] when pushing is enabled
/// without a target URL or job name.
pub fn build_metrics(config: &ConfigV1, registry: Registry) -> Result<Metrics> {
    let app = App::new(&config.app_name);
    let mut metrics = Metrics::with_registry(Metrics::DEFAULT_NAME, registry);
    configure(&mut metrics, config.metrics.clone(), &app)?;

    metrics.register_build_info(env!("CARGO_PKG_VERSION"))?;
    if let Err(e) = register_process_collector(&metrics) {
        warn!("Process metrics are unavailable: {}", e);
    }

    Ok(metrics)
}

/// The default registry already carries a process collector on Linux.
#[cfg(target_os = "linux")]
fn register_process_collector(metrics: &Metrics) -> Result<()> {
    let collector = prometheus::process_collector::ProcessCollector::for_self();
    match metrics.register(Box::new(collector)) {
        Err(Error::Prometheus(prometheus::Error::AlreadyReg)) => {
            debug!("Process collector already registered");
            Ok(())
        }
        other => other,
    }
}

#[cfg(not(target_os = "linux"))]
fn register_process_collector(_metrics: &Metrics) -> Result<()> {
    Ok(())
}

/// Initializes and runs the application server.
///
/// Binds to the address specified in the configuration, serves until
/// ctrl-c or SIGTERM, then stops the push loop.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, if the server fails to
/// bind to the specified address or encounters a runtime error.
pub async fn run(config: Arc<ConfigV1>) -> Result<()> {
    let metrics = Arc::new(build_metrics(
        &config,
        prometheus::default_registry().clone(),
    )?);
    metrics.serve().await?;

    let state = AppState {
        config: config.clone(),
        metrics: metrics.clone(),
    };
    let app = routes::create_router(state);

    info!("Starting server on {}", config.bind_address);
    let listener = TcpListener::bind(&config.bind_address).await?;
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    // Stop pushing even when the server failed.
    metrics.shutdown().await?;
    served?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
