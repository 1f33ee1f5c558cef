//! Store-specific error types.
//!
//! All store operations return [`StoreError`] on failure, which can be
//! matched to determine the underlying cause (transport, HTTP status, etc.).

use thiserror::Error;

/// Errors that can occur while talking to the time-series store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP transport failed (connection refused, timeout, TLS).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Store answered with a non-success status.
    #[error("store returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body (usually an InfluxDB JSON error).
        body: String,
    },

    /// Client could not be configured.
    #[error("config error: {0}")]
    Config(String),
}
