use serde::{Deserialize, Serialize};

use super::client::DoqClientConfig;
use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::tls::TlsConfig;

const LOCAL_CONFIG_PATH: &str = "ferrous-doq.toml";

/// Main configuration structure for Ferrous DoQ
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// DoQ client configuration (target, ALPN, handshake)
    #[serde(default)]
    pub doq: DoqClientConfig,

    /// Shared TLS settings
    #[serde(default)]
    pub tls: TlsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. ferrous-doq.toml in current directory
    /// 3. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if std::path::Path::new(LOCAL_CONFIG_PATH).exists() {
            Self::from_file(LOCAL_CONFIG_PATH)?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(server) = overrides.server {
            self.doq.server = server;
        }
        if let Some(name) = overrides.server_name {
            self.doq.server_name = Some(name);
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.doq.server.is_empty() {
            return Err(ConfigError::Validation(
                "No DoQ server configured".to_string(),
            ));
        }

        if self.tls.session_cache_size == 0 {
            return Err(ConfigError::Validation(
                "TLS session cache size cannot be 0".to_string(),
            ));
        }

        self.doq.validate()
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub server: Option<String>,
    pub server_name: Option<String>,
    pub log_level: Option<String>,
}
