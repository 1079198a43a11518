//! The metrics component: exposition, metric options and push lifecycle.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use prometheus::core::Collector;
use prometheus::{HistogramOpts, IntGauge, Opts, Registry, TextEncoder};
use tracing::{debug, info};

use super::config::MetricsConfig;
use super::pusher::{PushScheduler, PushTarget};
use crate::error::{Error, Result};
use crate::lifecycle::{App, Component};

/// Prometheus metrics component.
///
/// Wraps a registry (the process-wide default one unless another is given)
/// and optionally pushes it to a push-gateway while serving.
pub struct Metrics {
    name: String,
    config: MetricsConfig,
    registry: Registry,
    scheduler: Mutex<Option<PushScheduler>>,
}

impl Metrics {
    /// Name of the default metrics component and of its config section.
    pub const DEFAULT_NAME: &'static str = "metrics";

    /// Creates a component backed by the process-wide default registry.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_registry(name, prometheus::default_registry().clone())
    }

    /// Creates a component backed by the given registry.
    pub fn with_registry(name: impl Into<String>, registry: Registry) -> Self {
        Metrics {
            name: name.into(),
            config: MetricsConfig::default(),
            registry,
            scheduler: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &MetricsConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Whether a push loop is currently running.
    pub fn is_pushing(&self) -> bool {
        self.scheduler()
            .as_ref()
            .is_some_and(|scheduler| !scheduler.is_finished())
    }

    /// Renders all metrics in Prometheus text format.
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        Ok(encoder.encode_to_string(&metric_families)?)
    }

    /// Content type of [`Metrics::render`] output.
    pub fn content_type(&self) -> &'static str {
        prometheus::TEXT_FORMAT
    }

    /// Metric options qualified with the configured namespace and subsystem.
    pub fn opts(&self, name: &str, help: &str) -> Opts {
        Opts::new(name, help)
            .namespace(self.config.namespace.clone())
            .subsystem(self.config.subsystem.clone())
    }

    /// Histogram options qualified with the configured namespace and subsystem.
    pub fn histogram_opts(&self, name: &str, help: &str) -> HistogramOpts {
        HistogramOpts::from(self.opts(name, help))
    }

    /// Registers a collector in the component registry.
    pub fn register(&self, collector: Box<dyn Collector>) -> Result<()> {
        self.registry.register(collector)?;
        Ok(())
    }

    /// Registers a constant `build_info` gauge labelled with `version`.
    pub fn register_build_info(&self, version: &str) -> Result<IntGauge> {
        let gauge = IntGauge::with_opts(
            self.opts("build_info", "Build information of the running binary")
                .const_label("version", version),
        )?;
        gauge.set(1);
        self.register(Box::new(gauge.clone()))?;
        Ok(gauge)
    }

    fn scheduler(&self) -> MutexGuard<'_, Option<PushScheduler>> {
        // The guarded value stays consistent even if a holder panicked.
        self.scheduler
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new(Self::DEFAULT_NAME)
    }
}

#[async_trait]
impl Component for Metrics {
    type Config = MetricsConfig;

    fn name(&self) -> &str {
        &self.name
    }

    fn apply_config(&mut self, config: MetricsConfig) {
        self.config = config;
    }

    fn config_did_load(&mut self, app: &App) -> Result<()> {
        self.config.apply_defaults(&app.name);
        self.config.validate()
    }

    async fn serve(&self) -> Result<()> {
        if !self.config.push_enabled {
            debug!("Metrics push is disabled for '{}'", self.name);
            return Ok(());
        }

        let mut scheduler = self.scheduler();
        if scheduler.as_ref().is_some_and(|s| !s.is_finished()) {
            return Err(Error::AlreadyServing(self.name.clone()));
        }

        *scheduler = Some(PushScheduler::spawn(
            PushTarget::new(&self.config.push_target_url, &self.config.push_job_name),
            self.registry.clone(),
            self.config.push_interval(),
        ));
        Ok(())
    }

    async fn shutdown(&self) -> Result<()> {
        if !self.config.push_enabled {
            return Ok(());
        }

        // Take the handle out so the lock is not held across the await.
        let scheduler = self.scheduler().take();
        if let Some(scheduler) = scheduler {
            scheduler.stop().await?;
            info!("Metrics push for '{}' stopped", self.name);
        }
        Ok(())
    }
}
