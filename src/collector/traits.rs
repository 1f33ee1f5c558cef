//! Device client trait and error types.

use async_trait::async_trait;
use thiserror::Error;

use crate::storage::RawResponse;

/// Errors that can occur while calling an operation on the device.
///
/// The collector treats every variant the same way (skip the spec for this
/// cycle); the distinction only matters for logging.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// HTTP transport failed.
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Timeout elapsed.
    #[error("timeout elapsed")]
    Timeout,

    /// The device does not expose the requested service.
    #[error("unknown service: {0}")]
    UnknownService(String),

    /// Device answered with an unexpected HTTP status.
    #[error("device returned HTTP {0}")]
    Status(u16),

    /// The device rejected the action (SOAP fault).
    #[error("action error {code}: {description}")]
    Action {
        /// UPnP error code (e.g. 401 invalid action).
        code: u16,
        /// Error description from the device.
        description: String,
    },

    /// Response could not be parsed.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// Authentication failed or the challenge could not be answered.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),
}

impl From<roxmltree::Error> for DeviceError {
    fn from(e: roxmltree::Error) -> Self {
        Self::Malformed(e.to_string())
    }
}

/// A remote device exposing named operations grouped in sections.
///
/// Implementations collapse every failure mode into [`DeviceError`].
#[async_trait]
pub trait DeviceClient: Send + Sync {
    /// Invoke `operation` in `section` and return its named output values.
    async fn call(&self, section: &str, operation: &str) -> Result<RawResponse, DeviceError>;
}
