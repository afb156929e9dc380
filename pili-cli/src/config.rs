use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use pili_client::ClientConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// CLI configuration: credentials, default hub, API endpoints and logging.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CliConfig {
    pub access_key: String,
    pub secret_key: String,
    /// Hub used by stream commands
    pub hub: String,
    pub client: ClientConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "pretty"
    pub file_path: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "pretty".to_string(),
            file_path: None,
        }
    }
}

impl CliConfig {
    /// Load configuration from multiple sources with priority:
    /// 1. Environment variables (highest priority)
    /// 2. Config file (if provided)
    /// 3. Defaults (lowest priority)
    pub fn load(config_file: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = config_file {
            if Path::new(path).exists() {
                builder = builder.add_source(File::with_name(path));
            }
        }

        // PILI_ACCESS_KEY, PILI_CLIENT__API_HOST, PILI_LOGGING__LEVEL, ...
        builder = builder.add_source(
            Environment::with_prefix("PILI")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = CliConfig::default();
        assert!(config.access_key.is_empty());
        assert_eq!(config.client, ClientConfig::default());
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
access_key = "ak"
secret_key = "sk"
hub = "PiliSDKTest"

[client]
api_host = "pili.example.com"

[logging]
format = "json"
"#
        )
        .unwrap();

        let config = CliConfig::load(file.path().to_str()).unwrap();
        assert_eq!(config.access_key, "ak");
        assert_eq!(config.hub, "PiliSDKTest");
        assert_eq!(config.client.api_host, "pili.example.com");
        assert_eq!(config.client.api_version, "v2");
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = CliConfig::load(Some("/nonexistent/pili.toml")).unwrap();
        assert_eq!(config.client, ClientConfig::default());
    }
}
