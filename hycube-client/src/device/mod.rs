mod endpoint;
mod error;

use std::{fmt, time::Duration};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{
    header::{HeaderValue, AUTHORIZATION},
    Client, Url,
};
use serde_json::Value;

use crate::domain::{DeviceSnapshot, RawReading};

pub use endpoint::{Endpoint, BATTERY_SOC_REGISTER};
pub use error::DeviceError;

pub const DEFAULT_BASE_URL: &str = "http://hycube.local";
pub const DEFAULT_USERNAME: &str = "hycube";
pub const DEFAULT_PASSWORD: &str = "hycube";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct DeviceConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,
    pub request_timeout: Duration,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            username: DEFAULT_USERNAME.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Session token handed out by the device's auth endpoint.
///
/// Sent verbatim as the `Authorization` header of every data request.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken {
    raw: String,
    header: HeaderValue,
}

impl AuthToken {
    /// Build a token from the auth response body. Surrounding whitespace is dropped.
    pub fn parse(body: &str) -> Result<Self, DeviceError> {
        let raw = body.trim();
        if raw.is_empty() {
            return Err(DeviceError::Auth("device returned an empty token".to_string()));
        }

        let mut header = HeaderValue::from_str(raw)
            .map_err(|_| DeviceError::Auth("token is not a valid header value".to_string()))?;
        header.set_sensitive(true);

        Ok(Self {
            raw: raw.to_string(),
            header,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    fn header_value(&self) -> HeaderValue {
        self.header.clone()
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(..)")
    }
}

/// Value of the `Authorization` header sent to the auth endpoint.
///
/// The device expects the whole `Basic user:password` string base64-encoded,
/// scheme prefix included.
pub fn basic_credentials(username: &str, password: &str) -> String {
    STANDARD.encode(format!("Basic {username}:{password}"))
}

/// Decode a response body into a JSON object.
pub fn decode_reading(endpoint: Endpoint, body: &str) -> Result<RawReading, DeviceError> {
    let value: Value = serde_json::from_str(body).map_err(|e| DeviceError::Decode {
        endpoint,
        reason: e.to_string(),
    })?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(DeviceError::Decode {
            endpoint,
            reason: format!("expected a JSON object, got {}", json_kind(&other)),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// HTTP client for the device's local API.
#[derive(Clone)]
pub struct DeviceClient {
    http: Client,
    base_url: String,
    credentials: String,
}

impl DeviceClient {
    pub fn new(config: &DeviceConfig) -> Result<Self, DeviceError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| DeviceError::InvalidUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;

        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(DeviceError::Client)?;

        Ok(Self {
            http,
            base_url,
            credentials: basic_credentials(&config.username, &config.password),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, endpoint: Endpoint) -> Result<Url, DeviceError> {
        let url = format!("{}{}", self.base_url, endpoint.path());
        Url::parse(&url).map_err(|e| DeviceError::InvalidUrl {
            url,
            reason: e.to_string(),
        })
    }

    /// Fetch a fresh session token.
    pub async fn authenticate(&self) -> Result<AuthToken, DeviceError> {
        let url = self.url(Endpoint::Auth)?;
        tracing::debug!(%url, "requesting device token");

        let response = self
            .http
            .get(url)
            .header(AUTHORIZATION, &self.credentials)
            .send()
            .await
            .map_err(|e| DeviceError::Auth(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeviceError::Auth(format!("device returned HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| DeviceError::Auth(format!("failed to read token: {e}")))?;

        AuthToken::parse(&body)
    }

    /// GET one data endpoint and decode its body as a JSON object.
    pub async fn fetch_json(&self, endpoint: Endpoint, token: &AuthToken) -> Result<RawReading, DeviceError> {
        let url = self.url(endpoint)?;

        let response = self
            .http
            .get(url)
            .header(AUTHORIZATION, token.header_value())
            .send()
            .await
            .map_err(|source| DeviceError::Request { endpoint, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeviceError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| DeviceError::Request { endpoint, source })?;

        let reading = decode_reading(endpoint, &body)?;
        tracing::debug!(endpoint = endpoint.name(), keys = reading.len(), "fetched device document");
        Ok(reading)
    }

    /// Fetch the four data documents in order. The first failure aborts the rest.
    pub async fn snapshot(&self, token: &AuthToken) -> Result<DeviceSnapshot, DeviceError> {
        Ok(DeviceSnapshot {
            values: self.fetch_json(Endpoint::Values, token).await?,
            raw_registers: self.fetch_json(Endpoint::RawRegisters, token).await?,
            charger_statistics: self.fetch_json(Endpoint::ChargerStatistics, token).await?,
            charger_state: self.fetch_json(Endpoint::ChargerState, token).await?,
        })
    }
}
