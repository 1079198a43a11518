//! Configuration of the metrics component.

use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Push interval used when `pushInterval` is unset or not positive.
pub const DEFAULT_PUSH_INTERVAL_SECS: i64 = 3;

/// Longest accepted `pushInterval`, one day.
pub const MAX_PUSH_INTERVAL_SECS: i64 = 24 * 60 * 60;

/// Metrics section of the configuration.
///
/// Keys keep the camelCase names used by the host framework.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq, JsonSchema)]
#[serde(default)]
pub struct MetricsConfig {
    pub namespace: String,
    pub subsystem: String,
    #[serde(rename = "pushEnabled")]
    pub push_enabled: bool,
    #[serde(rename = "pushTargetURL")]
    pub push_target_url: String,
    /// Defaults to the application name.
    #[serde(rename = "pushJobName")]
    pub push_job_name: String,
    /// Seconds between pushes, defaults to 3.
    #[serde(rename = "pushInterval")]
    pub push_interval: i64,
}

impl MetricsConfig {
    /// Fills in the job name and interval defaults.
    pub fn apply_defaults(&mut self, app_name: &str) {
        if self.push_job_name.is_empty() {
            self.push_job_name = app_name.to_string();
        }

        if self.push_interval <= 0 {
            self.push_interval = DEFAULT_PUSH_INTERVAL_SECS;
        }
    }

    /// Checks that pushing has everything it needs when enabled.
    pub fn validate(&self) -> Result<()> {
        if self.push_enabled && (self.push_target_url.is_empty() || self.push_job_name.is_empty())
        {
            return Err(Error::InvalidConfig(
                "pushTargetURL, pushJobName must be set when pushEnabled is true".to_string(),
            ));
        }

        if self.push_interval > MAX_PUSH_INTERVAL_SECS {
            return Err(Error::InvalidConfig(format!(
                "pushInterval must not exceed {} seconds, got {}",
                MAX_PUSH_INTERVAL_SECS, self.push_interval
            )));
        }
        Ok(())
    }

    /// The interval between two pushes, clamped to [`MAX_PUSH_INTERVAL_SECS`].
    pub fn push_interval(&self) -> Duration {
        let secs = if self.push_interval <= 0 {
            DEFAULT_PUSH_INTERVAL_SECS
        } else {
            self.push_interval.min(MAX_PUSH_INTERVAL_SECS)
        };
        Duration::from_secs(secs.unsigned_abs())
    }
}
