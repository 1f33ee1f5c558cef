//! Application configuration structures.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::collector::tr064::Tr064Config;
use crate::collector::{MetricSpec, default_registry};
use crate::scheduler::DEFAULT_PERIOD;
use crate::storage::InfluxConfig;

use super::validation::{ConfigError, expand_env_vars};

fn default_period() -> Duration {
    DEFAULT_PERIOD
}

// =============================================================================
// Schedule Configuration
// =============================================================================

/// Collection schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Time between cycle starts (default: 20s).
    #[serde(default = "default_period", with = "humantime_serde")]
    pub period: Duration,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            period: DEFAULT_PERIOD,
        }
    }
}

// =============================================================================
// Application Configuration
// =============================================================================

/// Top-level application configuration.
///
/// Every section is optional; an empty file yields the defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Device (TR-064) connection.
    #[serde(default)]
    pub device: Tr064Config,

    /// InfluxDB connection.
    #[serde(default)]
    pub store: InfluxConfig,

    /// Collection schedule.
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Replacement metric registry; the built-in one is used when absent.
    #[serde(default)]
    pub metrics: Option<Vec<MetricSpec>>,
}

impl AppConfig {
    /// Load configuration from a YAML file.
    ///
    /// `${VAR}` and `${VAR:-default}` references are expanded first.
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read, parsed, or validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let expanded = expand_env_vars(content);
        let config: Self = if expanded.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(&expanded)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    /// Returns `ConfigError::ValidationError` if any field is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.device.address.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "device address cannot be empty".to_string(),
            ));
        }

        if self.device.port == Some(0) {
            return Err(ConfigError::ValidationError(
                "device port must be non-zero".to_string(),
            ));
        }

        if self.store.host.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "store host cannot be empty".to_string(),
            ));
        }

        if self.store.port == 0 {
            return Err(ConfigError::ValidationError(
                "store port must be non-zero".to_string(),
            ));
        }

        if self.store.database.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "store database cannot be empty".to_string(),
            ));
        }

        if self.schedule.period.is_zero() {
            return Err(ConfigError::ValidationError(
                "schedule period must be positive".to_string(),
            ));
        }

        if let Some(ref metrics) = self.metrics {
            validate_metrics(metrics)?;
        }

        Ok(())
    }

    /// The metric registry to poll.
    pub fn metric_specs(&self) -> Vec<MetricSpec> {
        self.metrics.clone().unwrap_or_else(default_registry)
    }
}

fn validate_metrics(metrics: &[MetricSpec]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for spec in metrics {
        if spec.section.is_empty() || spec.operation.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "metric '{}': section and operation cannot be empty",
                spec
            )));
        }
        if !seen.insert((&spec.section, &spec.operation)) {
            return Err(ConfigError::ValidationError(format!(
                "duplicate metric: '{}'",
                spec
            )));
        }
        if spec.fields.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "metric '{}': fields cannot be empty",
                spec
            )));
        }
        let mut fields = HashSet::new();
        if let Some(dup) = spec.fields.iter().find(|f| !fields.insert(*f)) {
            return Err(ConfigError::ValidationError(format!(
                "metric '{}': duplicate field '{}'",
                spec, dup
            )));
        }
    }

    Ok(())
}
