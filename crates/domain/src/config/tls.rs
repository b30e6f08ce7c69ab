use serde::{Deserialize, Serialize};

/// Settings of the TLS session-resumption cache shared by every DoQ client.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    #[serde(default = "default_session_cache_size")]
    pub session_cache_size: usize,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            session_cache_size: default_session_cache_size(),
        }
    }
}

fn default_session_cache_size() -> usize {
    64
}
