//! Configuration validation utilities.

use std::sync::LazyLock;
use std::time::Duration;

use regex::{Captures, Regex};
use thiserror::Error;

/// Errors raised while loading the YAML configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read config file: {0}")]
    IoError(#[from] std::io::Error),

    /// The file is not valid YAML for [`AppConfig`](crate::config::AppConfig).
    #[error("invalid config YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// A value is out of range or inconsistent.
    #[error("invalid config: {0}")]
    ValidationError(String),
}

/// Parse a duration string.
///
/// A bare integer is taken as seconds (`FETCH_EVERY=20`); anything else goes
/// through humantime: `30s`, `1m`, `5m30s`, `100ms`, etc.
///
/// # Examples
///
/// ```
/// use fritz_influx::config::parse_duration;
///
/// assert_eq!(parse_duration("20").unwrap().as_secs(), 20);
/// assert_eq!(parse_duration("30s").unwrap().as_secs(), 30);
/// assert_eq!(parse_duration("1m").unwrap().as_secs(), 60);
/// assert_eq!(parse_duration("1h30m").unwrap().as_secs(), 5400);
/// ```
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("duration string is empty".to_string());
    }
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }
    humantime::parse_duration(s).map_err(|e| e.to_string())
}

/// `${NAME}` or `${NAME:-fallback}`.
static ENV_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
        .expect("env reference pattern is valid")
});

/// Replace `${NAME}` and `${NAME:-fallback}` with values from the environment.
///
/// Unset variables without a fallback become empty. Bare `$NAME` is left alone.
pub fn expand_env_vars(input: &str) -> String {
    ENV_REFERENCE
        .replace_all(input, |caps: &Captures| {
            let fallback = caps.get(2).map_or("", |m| m.as_str());
            std::env::var(&caps[1]).unwrap_or_else(|_| fallback.to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_bare_seconds() {
        assert_eq!(parse_duration("20").unwrap(), Duration::from_secs(20));
        assert_eq!(parse_duration(" 5 ").unwrap(), Duration::from_secs(5));
    }

    #[test]
    fn test_parse_duration_humantime() {
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("1m").unwrap(), Duration::from_secs(60));
        assert_eq!(parse_duration("100ms").unwrap(), Duration::from_millis(100));
        assert_eq!(parse_duration("2h 30m").unwrap(), Duration::from_secs(9000));
    }

    #[test]
    fn test_parse_duration_invalid() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("abc").is_err());
        assert!(parse_duration("30x").is_err());
        assert!(parse_duration("-5").is_err());
    }

    #[test]
    fn test_expand_leaves_plain_yaml_alone() {
        let yaml = "device:\n  address: 192.168.178.1\n  password: $NOT_A_REFERENCE\n";
        assert_eq!(expand_env_vars(yaml), yaml);
    }

    #[test]
    fn test_expand_uses_fallback_for_unset_variables() {
        let yaml = "store:\n  host: ${FRITZ_INFLUX_TEST_UNSET_HOST:-influx.lan}\n  database: ${FRITZ_INFLUX_TEST_UNSET_DB:-}\n  username: ${FRITZ_INFLUX_TEST_UNSET_USER}\n";
        assert_eq!(
            expand_env_vars(yaml),
            "store:\n  host: influx.lan\n  database: \n  username: \n"
        );
    }

    #[test]
    fn test_expand_prefers_environment_over_fallback() {
        // SAFETY: the variable name is unique to this test.
        unsafe {
            std::env::set_var("FRITZ_INFLUX_TEST_ROUTER_PW", "s3cr3t");
        }
        let expanded = expand_env_vars(
            "device:\n  username: dslf-config\n  password: ${FRITZ_INFLUX_TEST_ROUTER_PW:-admin}\n",
        );
        // SAFETY: see above.
        unsafe {
            std::env::remove_var("FRITZ_INFLUX_TEST_ROUTER_PW");
        }
        assert_eq!(
            expanded,
            "device:\n  username: dslf-config\n  password: s3cr3t\n"
        );
    }

    #[test]
    fn test_config_error_messages() {
        let err = ConfigError::ValidationError("store port must be non-zero".to_string());
        assert_eq!(err.to_string(), "invalid config: store port must be non-zero");

        let yaml_err = serde_yaml::from_str::<u16>("not a port").unwrap_err();
        assert!(
            ConfigError::from(yaml_err)
                .to_string()
                .starts_with("invalid config YAML")
        );
    }
}
