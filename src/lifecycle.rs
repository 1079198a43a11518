//! Component lifecycle hooks.
//!
//! A component is configured once (`config_will_load`, `apply_config`,
//! `config_did_load`), then started with `serve` and stopped with `shutdown`.

use async_trait::async_trait;
use tracing::debug;

use crate::error::Result;

/// Descriptor of the hosting application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct App {
    pub name: String,
}

impl App {
    pub fn new(name: impl Into<String>) -> Self {
        App { name: name.into() }
    }
}

/// A pluggable part of the application with a managed lifecycle.
#[async_trait]
pub trait Component: Send + Sync {
    /// The configuration section this component reads.
    type Config: Send;

    /// Name of the component, also the key of its configuration section.
    fn name(&self) -> &str;

    /// Called before the configuration is handed over.
    fn config_will_load(&mut self, _app: &App) {}

    /// Stores the component configuration.
    fn apply_config(&mut self, config: Self::Config);

    /// Called after the configuration is stored. An error aborts startup.
    fn config_did_load(&mut self, app: &App) -> Result<()>;

    /// Starts the component's background work.
    async fn serve(&self) -> Result<()>;

    /// Stops the component's background work.
    async fn shutdown(&self) -> Result<()>;
}

/// Runs the configuration hooks of `component` in order.
pub fn configure<C: Component>(component: &mut C, config: C::Config, app: &App) -> Result<()> {
    debug!("Configuring component '{}'", component.name());
    component.config_will_load(app);
    component.apply_config(config);
    component.config_did_load(app)
}
