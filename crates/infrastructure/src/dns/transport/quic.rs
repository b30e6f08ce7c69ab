use super::tls::{build_quic_client_config, TlsSessionCache};
use async_trait::async_trait;
use ferrous_doq_application::ports::{DoqConnector, DoqSession, DoqStream, StreamRead};
use ferrous_doq_domain::{DomainError, DoqClientConfig, DoqTarget, UpstreamAddr};
use quinn_proto::{ConnectionIdGenerator, RandomConnectionIdGenerator};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::debug;

/// Dials QUIC sessions to one DoQ server.
///
/// IPv4 and IPv6 targets each get their own client endpoint, bound lazily on
/// first dial and reused for every session after that.
pub struct QuicConnector {
    target: DoqTarget,
    target_label: String,
    client_config: quinn::ClientConfig,
    connection_id_length: usize,
    handshake_timeout: Duration,
    endpoint_v4: OnceCell<quinn::Endpoint>,
    endpoint_v6: OnceCell<quinn::Endpoint>,
}

impl QuicConnector {
    pub fn new(
        config: &DoqClientConfig,
        session_cache: &TlsSessionCache,
    ) -> Result<Self, DomainError> {
        config
            .validate()
            .map_err(|e| DomainError::ConfigError(e.to_string()))?;
        let target = config
            .target()
            .map_err(|e| DomainError::ConfigError(e.to_string()))?;
        let client_config = build_quic_client_config(config, session_cache)?;

        Ok(Self {
            target_label: target.to_string(),
            target,
            client_config,
            connection_id_length: config.connection_id_length,
            handshake_timeout: config.handshake_timeout(),
            endpoint_v4: OnceCell::new(),
            endpoint_v6: OnceCell::new(),
        })
    }

    pub fn server_name(&self) -> &str {
        &self.target.server_name
    }

    async fn resolve(&self) -> Result<SocketAddr, DomainError> {
        match &self.target.addr {
            UpstreamAddr::Resolved(addr) => Ok(*addr),
            UpstreamAddr::Unresolved { hostname, port } => {
                let mut addrs = tokio::net::lookup_host((hostname.as_ref(), *port))
                    .await
                    .map_err(|e| self.session_failed(format!("DNS lookup failed: {}", e)))?;
                addrs
                    .next()
                    .ok_or_else(|| self.session_failed(format!("{} has no addresses", hostname)))
            }
        }
    }

    async fn endpoint_for(&self, addr: &SocketAddr) -> Result<&quinn::Endpoint, DomainError> {
        let (cell, bind) = if addr.is_ipv4() {
            (&self.endpoint_v4, "0.0.0.0:0")
        } else {
            (&self.endpoint_v6, "[::]:0")
        };

        cell.get_or_try_init(|| async { self.bind_endpoint(bind) })
            .await
    }

    fn bind_endpoint(&self, bind: &str) -> Result<quinn::Endpoint, DomainError> {
        let socket = std::net::UdpSocket::bind(bind)
            .map_err(|e| self.session_failed(format!("failed to bind UDP socket: {}", e)))?;
        socket
            .set_nonblocking(true)
            .map_err(|e| self.session_failed(format!("failed to set non-blocking: {}", e)))?;

        let cid_length = self.connection_id_length;
        let mut endpoint_config = quinn::EndpointConfig::default();
        endpoint_config.cid_generator(move || {
            Box::new(RandomConnectionIdGenerator::new(cid_length)) as Box<dyn ConnectionIdGenerator>
        });

        let mut endpoint =
            quinn::Endpoint::new(endpoint_config, None, socket, Arc::new(quinn::TokioRuntime))
                .map_err(|e| {
                    self.session_failed(format!("failed to create QUIC endpoint: {}", e))
                })?;
        endpoint.set_default_client_config(self.client_config.clone());

        debug!(bind = %bind, cid_length, "QUIC client endpoint created");
        Ok(endpoint)
    }

    fn session_failed(&self, reason: String) -> DomainError {
        DomainError::SessionFailed {
            server: self.target_label.clone(),
            reason,
        }
    }
}

#[async_trait]
impl DoqConnector for QuicConnector {
    type Session = QuicSession;

    async fn dial(&self) -> Result<QuicSession, DomainError> {
        let server_addr = self.resolve().await?;
        let endpoint = self.endpoint_for(&server_addr).await?;

        debug!(
            server = %self.target_label,
            addr = %server_addr,
            server_name = %self.target.server_name,
            "Opening QUIC session"
        );

        let connecting = endpoint
            .connect_with(
                self.client_config.clone(),
                server_addr,
                &self.target.server_name,
            )
            .map_err(|e| self.session_failed(e.to_string()))?;

        let conn = tokio::time::timeout(self.handshake_timeout, connecting)
            .await
            .map_err(|_| {
                self.session_failed(format!(
                    "handshake timed out after {:?}",
                    self.handshake_timeout
                ))
            })?
            .map_err(|e| self.session_failed(e.to_string()))?;

        debug!(
            server = %self.target_label,
            session_id = conn.stable_id(),
            "QUIC session established"
        );

        Ok(QuicSession {
            conn,
            server: Arc::from(self.target_label.as_str()),
        })
    }

    fn target(&self) -> &str {
        &self.target_label
    }
}

/// One QUIC connection. Clones share the connection.
#[derive(Clone)]
pub struct QuicSession {
    conn: quinn::Connection,
    server: Arc<str>,
}

impl QuicSession {
    pub fn stable_id(&self) -> usize {
        self.conn.stable_id()
    }
}

#[async_trait]
impl DoqSession for QuicSession {
    type Stream = QuicStream;

    async fn open_stream(&self) -> Result<QuicStream, DomainError> {
        let (send, recv) =
            self.conn
                .open_bi()
                .await
                .map_err(|e| DomainError::StreamOpenFailed {
                    server: self.server.to_string(),
                    reason: e.to_string(),
                })?;
        Ok(QuicStream { send, recv })
    }

    fn is_closed(&self) -> bool {
        self.conn.close_reason().is_some()
    }

    fn close(&self) {
        self.conn.close(quinn::VarInt::from_u32(0), b"");
    }
}

/// A bidirectional stream carrying exactly one query and its response.
pub struct QuicStream {
    send: quinn::SendStream,
    recv: quinn::RecvStream,
}

#[async_trait]
impl DoqStream for QuicStream {
    async fn write_all(&mut self, bytes: &[u8]) -> Result<(), DomainError> {
        self.send
            .write_all(bytes)
            .await
            .map_err(|e| DomainError::Write(e.to_string()))
    }

    fn finish(&mut self) -> Result<(), DomainError> {
        self.send
            .finish()
            .map_err(|e| DomainError::Write(e.to_string()))
    }

    async fn read(&mut self, buf: &mut [u8]) -> StreamRead {
        let mut filled = 0;
        while filled < buf.len() {
            match self.recv.read(&mut buf[filled..]).await {
                Ok(Some(n)) => filled += n,
                Ok(None) => break,
                Err(e) => return StreamRead::failed(filled, DomainError::Read(e.to_string())),
            }
        }
        StreamRead::complete(filled)
    }
}
