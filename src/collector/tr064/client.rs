//! TR-064 device client.
//!
//! Discovers services from the device descriptions once at construction,
//! then invokes actions via SOAP. Requests that come back `401` with a digest
//! challenge are retried once with credentials.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, WWW_AUTHENTICATE};
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};

use crate::collector::traits::{DeviceClient, DeviceError};
use crate::collector::tr064::description::{Service, parse_services};
use crate::collector::tr064::soap;
use crate::storage::RawResponse;

/// Default device address (FRITZ!Box fallback link-local IP).
pub const DEFAULT_ADDRESS: &str = "169.254.1.1";

/// Default TR-064 port for plain HTTP.
pub const DEFAULT_HTTP_PORT: u16 = 49000;

/// Default TR-064 port for HTTPS.
pub const DEFAULT_TLS_PORT: u16 = 49443;

/// Default user when none is configured.
pub const DEFAULT_USERNAME: &str = "dslf-config";

/// Password used when none is configured.
const FALLBACK_PASSWORD: &str = "admin";

/// Default request timeout (10 seconds).
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Main TR-064 description; required.
const TR64_DESC: &str = "tr64desc.xml";

/// UPnP IGD description; optional, provides the `WANCommonIFC1` style services.
const IGD_DESC: &str = "igddesc.xml";

fn default_address() -> String {
    DEFAULT_ADDRESS.to_string()
}

fn default_use_tls() -> bool {
    true
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

/// Connection settings for the TR-064 device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tr064Config {
    /// Device host name or IP (default: "169.254.1.1").
    #[serde(default = "default_address")]
    pub address: String,
    /// Port (default: 49443 with TLS, 49000 without).
    #[serde(default)]
    pub port: Option<u16>,
    /// Use HTTPS (default: true).
    #[serde(default = "default_use_tls")]
    pub use_tls: bool,
    /// Verify the device certificate (default: false, devices ship self-signed certs).
    #[serde(default)]
    pub verify_tls: bool,
    /// Login user (default: "dslf-config").
    #[serde(default)]
    pub username: Option<String>,
    /// Login password.
    #[serde(default)]
    pub password: Option<String>,
    /// Per-request timeout (default: 10s).
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for Tr064Config {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: None,
            use_tls: true,
            verify_tls: false,
            username: None,
            password: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Tr064Config {
    /// Effective port, falling back to the TR-064 defaults.
    pub fn effective_port(&self) -> u16 {
        match (self.port, self.use_tls) {
            (Some(port), _) => port,
            (None, true) => DEFAULT_TLS_PORT,
            (None, false) => DEFAULT_HTTP_PORT,
        }
    }

    /// Base URL of the device, e.g. `https://169.254.1.1:49443/`.
    pub fn base_url(&self) -> String {
        let scheme = if self.use_tls { "https" } else { "http" };
        format!("{}://{}:{}/", scheme, self.address, self.effective_port())
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set login credentials.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }
}

/// TR-064 SOAP client.
pub struct Tr064Client {
    client: Client,
    base: Url,
    services: HashMap<String, Service>,
    username: String,
    password: String,
}

impl std::fmt::Debug for Tr064Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tr064Client")
            .field("base", &self.base.as_str())
            .field("services", &self.services.len())
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl Tr064Client {
    /// Connect to the device and load its service descriptions.
    ///
    /// # Errors
    /// Fails if the client cannot be built or the main description cannot be
    /// fetched and parsed. A missing IGD description is only logged.
    pub async fn connect(config: &Tr064Config) -> Result<Self, DeviceError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()
            .map_err(|e| DeviceError::Config(format!("Failed to build HTTP client: {}", e)))?;

        let base_url = config.base_url();
        let base = Url::parse(&base_url).map_err(|e| {
            DeviceError::Config(format!("invalid device URL '{}': {}", base_url, e))
        })?;

        let mut services = HashMap::new();

        let tr64 = fetch_description(&client, &base, TR64_DESC).await?;
        register_services(&mut services, parse_services(&tr64)?);

        match fetch_description(&client, &base, IGD_DESC).await {
            Ok(igd) => match parse_services(&igd) {
                Ok(parsed) => register_services(&mut services, parsed),
                Err(e) => tracing::warn!(error = %e, "Ignoring unparsable IGD description"),
            },
            Err(e) => tracing::warn!(error = %e, "IGD description unavailable"),
        }

        if services.is_empty() {
            return Err(DeviceError::Malformed(
                "device description lists no services".to_string(),
            ));
        }

        let username = config
            .username
            .clone()
            .unwrap_or_else(|| DEFAULT_USERNAME.to_string());
        let password = config.password.clone().unwrap_or_else(|| {
            tracing::warn!("No device password set, using default");
            FALLBACK_PASSWORD.to_string()
        });

        tracing::info!(url = %base, services = services.len(), "Connected to device");

        Ok(Self {
            client,
            base,
            services,
            username,
            password,
        })
    }

    /// Whether the device advertises a service with this name.
    pub fn has_service(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }

    /// POST the action envelope, answering one digest challenge if needed.
    async fn post_action(
        &self,
        service: &Service,
        action: &str,
    ) -> Result<(StatusCode, String), DeviceError> {
        let url = self
            .base
            .join(&service.control_url)
            .map_err(|e| DeviceError::Config(format!("invalid control URL: {}", e)))?;
        let body = soap::envelope(&service.service_type, action);
        let soap_action = format!("\"{}#{}\"", service.service_type, action);

        let request = |authorization: Option<&str>| {
            let mut builder = self
                .client
                .post(url.clone())
                .header(CONTENT_TYPE, r#"text/xml; charset="utf-8""#)
                .header("SOAPACTION", soap_action.as_str())
                .body(body.clone());
            if let Some(value) = authorization {
                builder = builder.header(AUTHORIZATION, value);
            }
            builder
        };

        let mut response = request(None).send().await.map_err(map_transport)?;

        if response.status() == StatusCode::UNAUTHORIZED {
            let challenge = response
                .headers()
                .get(WWW_AUTHENTICATE)
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| DeviceError::Auth("401 without challenge".to_string()))?
                .to_string();
            let authorization = self.answer_challenge(&challenge, url.path(), body.as_bytes())?;

            response = request(Some(&authorization))
                .send()
                .await
                .map_err(map_transport)?;
            if response.status() == StatusCode::UNAUTHORIZED {
                return Err(DeviceError::Auth("credentials rejected".to_string()));
            }
        }

        let status = response.status();
        let text = response.text().await.map_err(map_transport)?;
        Ok((status, text))
    }

    fn answer_challenge(
        &self,
        challenge: &str,
        uri: &str,
        body: &[u8],
    ) -> Result<String, DeviceError> {
        let mut prompt =
            digest_auth::parse(challenge).map_err(|e| DeviceError::Auth(e.to_string()))?;
        let context = digest_auth::AuthContext::new_post(
            self.username.as_str(),
            self.password.as_str(),
            uri,
            Some(body),
        );
        let answer = prompt
            .respond(&context)
            .map_err(|e| DeviceError::Auth(e.to_string()))?;
        Ok(answer.to_header_string())
    }
}

#[async_trait::async_trait]
impl DeviceClient for Tr064Client {
    async fn call(&self, section: &str, operation: &str) -> Result<RawResponse, DeviceError> {
        let service = self
            .services
            .get(section)
            .ok_or_else(|| DeviceError::UnknownService(section.to_string()))?;

        let (status, text) = self.post_action(service, operation).await?;
        if status.is_success() {
            soap::parse_response(&text, operation)
        } else {
            Err(soap::parse_fault(&text).unwrap_or(DeviceError::Status(status.as_u16())))
        }
    }
}

/// First definition of a name wins.
fn register_services(services: &mut HashMap<String, Service>, parsed: Vec<Service>) {
    for service in parsed {
        services.entry(service.name.clone()).or_insert(service);
    }
}

async fn fetch_description(
    client: &Client,
    base: &Url,
    path: &str,
) -> Result<String, DeviceError> {
    let url = base
        .join(path)
        .map_err(|e| DeviceError::Config(format!("invalid description URL: {}", e)))?;
    let response = client.get(url).send().await.map_err(map_transport)?;
    if !response.status().is_success() {
        return Err(DeviceError::Status(response.status().as_u16()));
    }
    response.text().await.map_err(map_transport)
}

fn map_transport(e: reqwest::Error) -> DeviceError {
    if e.is_timeout() {
        DeviceError::Timeout
    } else {
        DeviceError::Transport(e)
    }
}
