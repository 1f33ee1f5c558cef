//! Configuration module.
//!
//! Provides YAML-based configuration loading and validation for:
//! - Device settings (address, TLS, credentials, timeout)
//! - Store settings (InfluxDB host, credentials, database)
//! - Schedule (collection period)
//! - Optional replacement metric registry

mod app;
mod validation;

pub use app::{AppConfig, ScheduleConfig};
pub use validation::{ConfigError, expand_env_vars, parse_duration};
