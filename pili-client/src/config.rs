use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::ClientError;

/// Client configuration
///
/// Passed explicitly to [`Client::new`](crate::Client::new); there is no
/// process-wide API host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    /// `http` or `https`
    pub api_scheme: String,
    pub api_host: String,
    pub api_version: String,
    pub rtc_host: String,
    pub rtc_version: String,
    pub user_agent: String,
    pub connect_timeout_seconds: u64,
    pub timeout_seconds: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_scheme: "http".to_string(),
            api_host: "pili.qiniuapi.com".to_string(),
            api_version: "v2".to_string(),
            rtc_host: "rtc.qiniuapi.com".to_string(),
            rtc_version: "v1".to_string(),
            user_agent: format!("pili-sdk-rust/{}", env!("CARGO_PKG_VERSION")),
            connect_timeout_seconds: 10,
            timeout_seconds: 30,
        }
    }
}

impl ClientConfig {
    /// Load configuration
    ///
    /// Priority:
    /// 1. Environment variables (highest priority), e.g. `PILI_API_HOST`
    /// 2. Config file
    /// 3. Defaults
    pub fn load(config_file: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = config_file {
            if Path::new(path).exists() {
                builder = builder.add_source(File::with_name(path));
            }
        }

        builder = builder.add_source(Environment::with_prefix("PILI").try_parsing(true));

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Load from environment variables only
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    /// Override the API host, keeping everything else.
    #[must_use]
    pub fn with_api_host(mut self, host: impl Into<String>) -> Self {
        self.api_host = host.into();
        self
    }

    #[must_use]
    pub fn api_base(&self) -> String {
        format!("{}://{}/{}", self.api_scheme, self.api_host, self.api_version)
    }

    #[must_use]
    pub fn rtc_base(&self) -> String {
        format!("{}://{}/{}", self.api_scheme, self.rtc_host, self.rtc_version)
    }

    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Reject configurations that cannot produce valid requests.
    pub fn validate(&self) -> Result<(), ClientError> {
        if !matches!(self.api_scheme.as_str(), "http" | "https") {
            return Err(ClientError::InvalidConfig(format!(
                "api_scheme must be http or https, got {:?}",
                self.api_scheme
            )));
        }
        for (name, value) in [
            ("api_host", &self.api_host),
            ("api_version", &self.api_version),
            ("rtc_host", &self.rtc_host),
            ("rtc_version", &self.rtc_version),
        ] {
            if value.trim().is_empty() {
                return Err(ClientError::InvalidConfig(format!("{name} must not be empty")));
            }
        }
        if self.api_host.contains('/') || self.rtc_host.contains('/') {
            return Err(ClientError::InvalidConfig(
                "hosts must not contain a scheme or path".to_string(),
            ));
        }
        if self.connect_timeout_seconds == 0 || self.timeout_seconds == 0 {
            return Err(ClientError::InvalidConfig("timeouts must be positive".to_string()));
        }
        Ok(())
    }
}
