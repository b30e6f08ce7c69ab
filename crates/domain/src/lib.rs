//! Ferrous DoQ Domain Layer
pub mod config;
pub mod doq_target;
pub mod errors;

pub use config::{CliOverrides, Config, ConfigError, DoqClientConfig, LoggingConfig, TlsConfig};
pub use doq_target::{DoqTarget, UpstreamAddr, DEFAULT_DOQ_PORT};
pub use errors::DomainError;

/// Largest DNS message that fits in a single DoQ stream.
pub const MAX_DNS_MESSAGE_SIZE: usize = 65535;

/// ALPN token of the DoQ draft this client speaks.
pub const NEXT_PROTO_DQ: &str = "doq-i00";
