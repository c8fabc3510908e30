use std::{env, fs, net::SocketAddr, path::Path, time::Duration};

use anyhow::{bail, Context};
use hycube_client::{device, DeviceConfig};
use serde::Deserialize;

pub const CONFIG_PATH_ENV: &str = "HYCUBE_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "hycube-ingest.toml";
pub const DEVICE_PASSWORD_ENV: &str = "HYCUBE_DEVICE_PASSWORD";
pub const SINK_PASSWORD_ENV: &str = "HYCUBE_SINK_PASSWORD";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DeviceSettings {
    pub base_url: String,
    pub username: String,
    pub password: String,
    pub request_timeout_ms: u64,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        let defaults = DeviceConfig::default();
        Self {
            base_url: defaults.base_url,
            username: defaults.username,
            password: defaults.password,
            request_timeout_ms: defaults.request_timeout.as_millis() as u64,
        }
    }
}

impl DeviceSettings {
    pub fn to_client_config(&self) -> DeviceConfig {
        DeviceConfig {
            base_url: self.base_url.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// InfluxDB 1.x HTTP `/write` API.
    #[default]
    Http,
    /// Raw line protocol over TCP.
    Tcp,
    /// Print the batch instead of writing it.
    Stdout,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    pub kind: SinkKind,
    pub url: String,
    pub tcp_addr: Option<String>,
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub request_timeout_ms: u64,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            kind: SinkKind::Http,
            url: "http://homeserver.local:8086".to_string(),
            tcp_addr: None,
            database: "power".to_string(),
            username: None,
            password: None,
            request_timeout_ms: device::DEFAULT_REQUEST_TIMEOUT.as_millis() as u64,
        }
    }
}

impl SinkConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Empty strings count as unset.
    pub fn credentials(&self) -> Option<(String, Option<String>)> {
        let username = self.username.as_deref().filter(|u| !u.is_empty())?;
        let password = self.password.clone().filter(|p| !p.is_empty());
        Some((username.to_string(), password))
    }

    pub fn tcp_socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = self
            .tcp_addr
            .as_deref()
            .context("sink.tcp_addr is required when sink.kind = \"tcp\"")?;
        addr.parse()
            .with_context(|| format!("invalid sink.tcp_addr '{addr}'"))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    pub interval_secs: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self { interval_secs: 10 }
    }
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub device: DeviceSettings,
    pub sink: SinkConfig,
    pub poll: PollConfig,
    pub metrics: Option<MetricsConfig>,
}

impl AppConfig {
    /// Load from `$HYCUBE_CONFIG`, or `hycube-ingest.toml` when unset.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(env::var(CONFIG_PATH_ENV).ok(), |key| env::var(key).ok())
    }

    /// An explicitly configured file must exist. A missing default file means
    /// built-in defaults. Overrides from `lookup` are applied before validation.
    pub fn load_from<F>(explicit: Option<String>, lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::load_with_default(explicit, Path::new(DEFAULT_CONFIG_PATH), lookup)
    }

    fn load_with_default<F>(explicit: Option<String>, default_path: &Path, lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = match explicit {
            Some(path) => Self::read_file(Path::new(&path))?,
            None if default_path.exists() => Self::read_file(default_path)?,
            None => {
                tracing::info!(path = %default_path.display(), "no config file, using defaults");
                AppConfig::default()
            }
        };

        cfg.apply_overrides(lookup);
        cfg.validate()?;
        Ok(cfg)
    }

    fn read_file(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{}'", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("failed to parse config file '{}'", path.display()))
    }

    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        let cfg: AppConfig = toml::from_str(contents)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Secrets that may be kept out of the config file.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(password) = lookup(DEVICE_PASSWORD_ENV) {
            self.device.password = password;
        }
        if let Some(password) = lookup(SINK_PASSWORD_ENV) {
            self.sink.password = Some(password);
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.poll.interval_secs == 0 {
            bail!("poll.interval_secs must be at least 1");
        }
        if self.device.request_timeout_ms == 0 || self.sink.request_timeout_ms == 0 {
            bail!("request_timeout_ms must be positive");
        }
        if self.sink.kind == SinkKind::Tcp {
            self.sink.tcp_socket_addr()?;
        }
        if self.sink.kind == SinkKind::Http && self.sink.database.is_empty() {
            bail!("sink.database must not be empty");
        }
        Ok(())
    }
}
