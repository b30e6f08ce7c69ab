use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. `info` or `ferrous_doq=debug,quinn=warn`
    #[serde(default = "default_filter")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_filter(),
        }
    }
}

fn default_filter() -> String {
    "info".to_string()
}
