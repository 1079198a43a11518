use std::path::Path;

use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use crate::error::Result;
use crate::metrics::MetricsConfig;

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "./config.yaml";

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct ConfigV1 {
    /// Application name, used as the default push job name.
    pub app_name: String,
    pub bind_address: String,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Builds the figment for the given YAML file.
///
/// `PUSHMETRICS_BIND_ADDRESS` and `PUSHMETRICS_APP_NAME` override the file.
pub fn figment_for(path: impl AsRef<Path>) -> Figment {
    Figment::new()
        .merge(Yaml::file(path.as_ref()))
        .merge(Env::prefixed("PUSHMETRICS_").only(&["bind_address", "app_name"]))
}

/// Extracts a [`ConfigV1`] out of an already assembled figment.
pub fn extract_config(figment: &Figment) -> Result<ConfigV1> {
    let config = figment.extract::<Config>()?;
    // handle configuration migration between versions here when necessary
    match config {
        Config::ConfigV1(c) => Ok(c),
    }
}

/// Load config from the YAML file at `path`.
pub fn load_config_from(path: impl AsRef<Path>) -> Result<ConfigV1> {
    extract_config(&figment_for(path))
}

/// Print the JSON schema for the configuration to stdout.
pub fn print_schema() -> Result<()> {
    let schema = schema_for!(Config);
    let rendered = serde_json::to_string_pretty(&schema)?;
    println!("{}", rendered);
    Ok(())
}
