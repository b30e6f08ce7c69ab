//! TLS configuration for DNS-over-QUIC
//!
//! - One session-resumption store shared by every client that is handed the
//!   same [`TlsSessionCache`], so reconnects can skip the full handshake
//! - Certificate verification is off unless the client config asks for it

use ferrous_doq_domain::{DoqClientConfig, DomainError};
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::client::{ClientSessionMemoryCache, ClientSessionStore, Resumption};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{DigitallySignedStruct, SignatureScheme};
use std::sync::Arc;

/// TLS session-resumption cache shared across DoQ clients.
#[derive(Debug, Clone)]
pub struct TlsSessionCache {
    store: Arc<ClientSessionMemoryCache>,
}

impl TlsSessionCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            store: Arc::new(ClientSessionMemoryCache::new(capacity)),
        }
    }

    pub fn store(&self) -> Arc<dyn ClientSessionStore> {
        self.store.clone()
    }

    /// Whether two handles point at the same underlying store.
    pub fn shares_store_with(&self, other: &TlsSessionCache) -> bool {
        Arc::ptr_eq(&self.store, &other.store)
    }
}

impl Default for TlsSessionCache {
    fn default() -> Self {
        Self::new(64)
    }
}

/// Builds the rustls client config used for every DoQ handshake.
pub fn build_tls_config(
    config: &DoqClientConfig,
    session_cache: &TlsSessionCache,
) -> rustls::ClientConfig {
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let mut tls_config = if config.insecure_skip_verify {
        rustls::ClientConfig::builder()
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(NoVerify))
            .with_no_client_auth()
    } else {
        let root_store =
            rustls::RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        rustls::ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth()
    };

    tls_config.alpn_protocols = config
        .alpn
        .iter()
        .map(|protocol| protocol.as_bytes().to_vec())
        .collect();
    tls_config.resumption = Resumption::store(session_cache.store());

    tls_config
}

/// Builds the quinn client config wrapping [`build_tls_config`].
pub fn build_quic_client_config(
    config: &DoqClientConfig,
    session_cache: &TlsSessionCache,
) -> Result<quinn::ClientConfig, DomainError> {
    let tls_config = build_tls_config(config, session_cache);

    let quic_config = quinn::crypto::rustls::QuicClientConfig::try_from(Arc::new(tls_config))
        .map_err(|e| DomainError::ConfigError(format!("Invalid QUIC TLS config: {}", e)))?;

    Ok(quinn::ClientConfig::new(Arc::new(quic_config)))
}

/// Accepts any server certificate.
#[derive(Debug)]
pub struct NoVerify;

impl ServerCertVerifier for NoVerify {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        vec![
            SignatureScheme::RSA_PKCS1_SHA256,
            SignatureScheme::RSA_PKCS1_SHA384,
            SignatureScheme::RSA_PKCS1_SHA512,
            SignatureScheme::ECDSA_NISTP256_SHA256,
            SignatureScheme::ECDSA_NISTP384_SHA384,
            SignatureScheme::ECDSA_NISTP521_SHA512,
            SignatureScheme::RSA_PSS_SHA256,
            SignatureScheme::RSA_PSS_SHA384,
            SignatureScheme::RSA_PSS_SHA512,
            SignatureScheme::ED25519,
        ]
    }
}
