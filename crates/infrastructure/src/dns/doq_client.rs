use super::codec::HickoryCodec;
use super::transport::quic::QuicConnector;
use super::transport::tls::TlsSessionCache;
use ferrous_doq_application::ports::DoqConnector;
use ferrous_doq_application::DoqClient;
use ferrous_doq_domain::{DomainError, DoqClientConfig};
use tracing::info;

/// DoQ client over quinn, speaking hickory-proto messages.
pub type QuicDoqClient = DoqClient<QuicConnector, HickoryCodec>;

/// Builds a client; [`QuicConnector::new`] validates `config`. No session is
/// opened until the first exchange.
pub fn build_doq_client(
    config: &DoqClientConfig,
    session_cache: &TlsSessionCache,
) -> Result<QuicDoqClient, DomainError> {
    let connector = QuicConnector::new(config, session_cache)?;

    info!(
        server = %connector.target(),
        server_name = %connector.server_name(),
        alpn = ?config.alpn,
        insecure_skip_verify = config.insecure_skip_verify,
        "DoQ client created"
    );

    Ok(DoqClient::new(connector, HickoryCodec))
}
