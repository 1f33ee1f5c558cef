//! InfluxDB v1 HTTP client.
//!
//! Writes batches to `/write?db=<database>` as line protocol and checks
//! reachability via `/ping` at construction.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::storage::error::StoreError;
use crate::storage::line_protocol::encode_batch;
use crate::storage::publisher::StoreClient;
use crate::storage::types::DataPoint;

/// Default InfluxDB HTTP port.
pub const DEFAULT_PORT: u16 = 8086;

/// Default database name.
pub const DEFAULT_DATABASE: &str = "fritz.box";

/// Default request timeout (10 seconds).
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_credential() -> String {
    "influxdb".to_string()
}

fn default_database() -> String {
    DEFAULT_DATABASE.to_string()
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

/// Connection settings for the InfluxDB store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfluxConfig {
    /// Server host name or IP (default: "localhost").
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port (default: 8086).
    #[serde(default = "default_port")]
    pub port: u16,
    /// Use HTTPS (default: false).
    #[serde(default)]
    pub use_tls: bool,
    /// Basic-auth user (default: "influxdb").
    #[serde(default = "default_credential")]
    pub username: String,
    /// Basic-auth password (default: "influxdb").
    #[serde(default = "default_credential")]
    pub password: String,
    /// Target database (default: "fritz.box").
    #[serde(default = "default_database")]
    pub database: String,
    /// Request timeout (default: 10s).
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for InfluxConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: DEFAULT_PORT,
            use_tls: false,
            username: default_credential(),
            password: default_credential(),
            database: default_database(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl InfluxConfig {
    /// Base URL of the server, e.g. `http://localhost:8086/`.
    pub fn base_url(&self) -> String {
        let scheme = if self.use_tls { "https" } else { "http" };
        format!("{}://{}:{}/", scheme, self.host, self.port)
    }

    /// Set the database name.
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// InfluxDB v1 store client.
pub struct InfluxClient {
    client: Client,
    write_url: Url,
    ping_url: Url,
    username: String,
    password: String,
}

impl std::fmt::Debug for InfluxClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InfluxClient")
            .field("write_url", &self.write_url.as_str())
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl InfluxClient {
    /// Build a client without contacting the server.
    ///
    /// # Errors
    /// Returns `StoreError::Config` if the URL or HTTP client cannot be built.
    pub fn new(config: &InfluxConfig) -> Result<Self, StoreError> {
        Self::from_base_url(&config.base_url(), config)
    }

    /// Build a client and verify the server answers `/ping`.
    ///
    /// # Errors
    /// Returns an error if the client cannot be built or the server is unreachable.
    pub async fn connect(config: &InfluxConfig) -> Result<Self, StoreError> {
        let client = Self::new(config)?;
        client.ping().await?;
        tracing::info!(
            url = %client.ping_url,
            database = %config.database,
            "Connected to InfluxDB"
        );
        Ok(client)
    }

    fn from_base_url(base: &str, config: &InfluxConfig) -> Result<Self, StoreError> {
        let base = Url::parse(base)
            .map_err(|e| StoreError::Config(format!("invalid store URL '{}': {}", base, e)))?;

        let mut write_url = base
            .join("write")
            .map_err(|e| StoreError::Config(format!("invalid write URL: {}", e)))?;
        write_url
            .query_pairs_mut()
            .append_pair("db", &config.database);

        let ping_url = base
            .join("ping")
            .map_err(|e| StoreError::Config(format!("invalid ping URL: {}", e)))?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            write_url,
            ping_url,
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    /// Check that the server is reachable.
    pub async fn ping(&self) -> Result<(), StoreError> {
        let response = self
            .client
            .get(self.ping_url.clone())
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await?;
        check_status(response).await
    }
}

#[async_trait::async_trait]
impl StoreClient for InfluxClient {
    async fn write_batch(&self, points: &[DataPoint]) -> Result<usize, StoreError> {
        let (body, lines) = encode_batch(points);
        if lines == 0 {
            tracing::debug!(points = points.len(), "No encodable points, nothing written");
            return Ok(0);
        }

        let response = self
            .client
            .post(self.write_url.clone())
            .basic_auth(&self.username, Some(&self.password))
            .header(reqwest::header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(body)
            .send()
            .await?;
        check_status(response).await?;

        tracing::debug!(lines, "Wrote points to InfluxDB");
        Ok(lines)
    }
}

async fn check_status(response: reqwest::Response) -> Result<(), StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::Status {
        status: status.as_u16(),
        body: body.trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{PublishOutcome, publish};
    use mockito::Matcher;

    fn test_client(server: &mockito::Server) -> InfluxClient {
        let config = InfluxConfig::default().with_timeout(Duration::from_secs(2));
        InfluxClient::from_base_url(&format!("{}/", server.url()), &config).unwrap()
    }

    #[test]
    fn test_influx_config_defaults() {
        let config = InfluxConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.username, "influxdb");
        assert_eq!(config.password, "influxdb");
        assert_eq!(config.database, DEFAULT_DATABASE);
        assert_eq!(config.base_url(), "http://localhost:8086/");
    }

    #[test]
    fn test_influx_config_tls_url() {
        let config = InfluxConfig {
            host: "influx.lan".to_string(),
            port: 8443,
            use_tls: true,
            ..InfluxConfig::default()
        };
        assert_eq!(config.base_url(), "https://influx.lan:8443/");
    }

    #[tokio::test]
    async fn test_write_batch_posts_line_protocol() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/write")
            .match_query(Matcher::UrlEncoded("db".into(), DEFAULT_DATABASE.into()))
            .match_header("authorization", Matcher::Regex("^Basic ".into()))
            .match_body("fritz.box,operation=GetTotalBytesSent,section=WAN NewTotalBytesSent=12345i\n")
            .with_status(204)
            .create_async()
            .await;

        let client = test_client(&server);
        let points = vec![
            DataPoint::new("WAN", "GetTotalBytesSent").with_field("NewTotalBytesSent", 12345_i64),
        ];
        assert_eq!(client.write_batch(&points).await.unwrap(), 1);

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_write_batch_reports_status_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/write")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(r#"{"error":"database not found: \"fritz.box\""}"#)
            .create_async()
            .await;

        let client = test_client(&server);
        let points = vec![DataPoint::new("WAN", "GetInfo").with_field("x", 1_i64)];
        let err = client.write_batch(&points).await.unwrap_err();

        match err {
            StoreError::Status { status, body } => {
                assert_eq!(status, 404);
                assert!(body.contains("database not found"));
            }
            other => panic!("expected Status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_write_batch_without_fields_makes_no_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/write")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let client = test_client(&server);
        let points = vec![DataPoint::new("WLANConfiguration3", "GetStatistics")];
        assert_eq!(client.write_batch(&points).await.unwrap(), 0);

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_publish_field_less_batch_reports_skipped() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/write")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let client = test_client(&server);
        let batch = vec![
            DataPoint::new("WLANConfiguration2", "GetStatistics"),
            DataPoint::new("WANDSLInterfaceConfig1", "GetInfo"),
        ];
        let outcome = publish(&batch, &client).await.unwrap();

        assert_eq!(outcome, PublishOutcome::Skipped);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_ping() {
        let mut server = mockito::Server::new_async().await;
        let _ok = server
            .mock("GET", "/ping")
            .with_status(204)
            .create_async()
            .await;

        let client = test_client(&server);
        assert!(client.ping().await.is_ok());
    }

    #[tokio::test]
    async fn test_connect_fails_when_unreachable() {
        // Nothing listens on port 1
        let config = InfluxConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            ..InfluxConfig::default()
        }
        .with_timeout(Duration::from_millis(500));

        let result = InfluxClient::connect(&config).await;
        assert!(matches!(result, Err(StoreError::Transport(_))));
    }
}
