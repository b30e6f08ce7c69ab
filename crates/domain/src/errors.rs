use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Failed to open QUIC session to {server}: {reason}")]
    SessionFailed { server: String, reason: String },

    #[error("Failed to open new stream to {server}: {reason}")]
    StreamOpenFailed { server: String, reason: String },

    #[error("Failed to encode DNS message: {0}")]
    Encode(String),

    #[error("Failed to write DNS query: {0}")]
    Write(String),

    #[error("Failed to read DNS response: {0}")]
    Read(String),

    #[error("Failed to decode DNS response: {0}")]
    Decode(String),

    #[error("Query cancelled")]
    Cancelled,

    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl DomainError {
    /// Errors raised before any request byte left the client.
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            DomainError::SessionFailed { .. } | DomainError::StreamOpenFailed { .. }
        )
    }
}
