use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::errors::ConfigError;
use crate::{DoqTarget, NEXT_PROTO_DQ};

/// Largest connection ID QUIC v1 allows.
const MAX_CONNECTION_ID_LENGTH: usize = 20;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DoqClientConfig {
    /// Target server, e.g. `doq://dns.adguard-dns.com:853` or `94.140.14.14:853`
    pub server: String,

    /// SNI override; defaults to the host part of `server`
    #[serde(default)]
    pub server_name: Option<String>,

    #[serde(default = "default_alpn")]
    pub alpn: Vec<String>,

    #[serde(default = "default_handshake_timeout_secs")]
    pub handshake_timeout_secs: u64,

    #[serde(default = "default_connection_id_length")]
    pub connection_id_length: usize,

    #[serde(default = "default_true")]
    pub insecure_skip_verify: bool,
}

impl DoqClientConfig {
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            ..Self::default()
        }
    }

    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_secs(self.handshake_timeout_secs)
    }

    /// Parses `server` and applies the `server_name` override.
    pub fn target(&self) -> Result<DoqTarget, ConfigError> {
        let target: DoqTarget = self
            .server
            .parse()
            .map_err(ConfigError::Validation)?;
        Ok(match self.server_name.as_deref() {
            Some(name) if !name.is_empty() => target.with_server_name(name),
            _ => target,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.target()?;

        if self.alpn.is_empty() {
            return Err(ConfigError::Validation(
                "At least one ALPN protocol is required".to_string(),
            ));
        }

        if self.handshake_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "Handshake timeout cannot be 0".to_string(),
            ));
        }

        if self.connection_id_length > MAX_CONNECTION_ID_LENGTH {
            return Err(ConfigError::Validation(format!(
                "Connection ID length {} exceeds {} bytes",
                self.connection_id_length, MAX_CONNECTION_ID_LENGTH
            )));
        }

        Ok(())
    }
}

impl Default for DoqClientConfig {
    fn default() -> Self {
        Self {
            server: String::new(),
            server_name: None,
            alpn: default_alpn(),
            handshake_timeout_secs: default_handshake_timeout_secs(),
            connection_id_length: default_connection_id_length(),
            insecure_skip_verify: true,
        }
    }
}

fn default_alpn() -> Vec<String> {
    vec![
        "http/1.1".to_string(),
        "h2".to_string(),
        NEXT_PROTO_DQ.to_string(),
    ]
}

fn default_handshake_timeout_secs() -> u64 {
    8
}

fn default_connection_id_length() -> usize {
    12
}

fn default_true() -> bool {
    true
}
