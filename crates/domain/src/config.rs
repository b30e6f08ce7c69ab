pub mod client;
pub mod errors;
pub mod logging;
pub mod root;
pub mod tls;

pub use client::DoqClientConfig;
pub use errors::ConfigError;
pub use logging::LoggingConfig;
pub use root::{CliOverrides, Config};
pub use tls::TlsConfig;
