//! DNS-over-QUIC exchange over one long-lived, shared session.
//!
//! Each call opens its own bidirectional stream, sends the encoded query,
//! half-closes the write side (the DoQ end-of-query signal) and reads the
//! reply into a pooled buffer.

use super::buffer_pool::PoolStats;
use super::session_manager::SessionManager;
use crate::ports::{DnsExchanger, DoqConnector, DoqSession, DoqStream, MessageCodec};
use async_trait::async_trait;
use ferrous_doq_domain::DomainError;
use hickory_proto::op::Message;
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub struct DoqClient<C: DoqConnector, K: MessageCodec> {
    sessions: SessionManager<C>,
    codec: K,
}

impl<C: DoqConnector, K: MessageCodec> DoqClient<C, K> {
    pub fn new(connector: C, codec: K) -> Self {
        let buffer_size = codec.max_message_size();
        Self {
            sessions: SessionManager::new(connector, buffer_size),
            codec,
        }
    }

    pub fn target(&self) -> &str {
        self.sessions.target()
    }

    pub fn sessions(&self) -> &SessionManager<C> {
        &self.sessions
    }

    /// Same as [`exchange_context`](Self::exchange_context) with a token that never fires.
    pub async fn exchange(&self, request: &K::Message) -> Result<K::Message, DomainError> {
        self.exchange_context(&CancellationToken::new(), request)
            .await
    }

    /// Sends `request` and waits for the response.
    ///
    /// `ctx` can abort the call while the session is acquired or the stream is
    /// opened; once the query is being written the call runs to completion.
    pub async fn exchange_context(
        &self,
        ctx: &CancellationToken,
        request: &K::Message,
    ) -> Result<K::Message, DomainError> {
        let session = cancellable(ctx, self.sessions.get_session()).await?;

        let mut stream = self.open_stream(ctx, &session).await?;

        let query = self.codec.encode(request)?;

        stream.write_all(&query).await?;

        if let Err(e) = stream.finish() {
            debug!(server = %self.target(), error = %e, "Failed to half-close DoQ stream");
        }

        let pool = self.sessions.bytes_pool().await;
        let mut buf = pool.get();

        let read = stream.read(&mut buf).await;
        if let Some(e) = read.error {
            if read.len == 0 {
                return Err(e);
            }
            debug!(
                server = %self.target(),
                response_len = read.len,
                error = %e,
                "DoQ read ended with error after data, decoding what arrived"
            );
        }

        self.codec.decode(&buf[..read.len])
    }

    /// Opens a stream; on failure re-acquires a session and tries exactly once more.
    async fn open_stream(
        &self,
        ctx: &CancellationToken,
        session: &C::Session,
    ) -> Result<<C::Session as DoqSession>::Stream, DomainError> {
        let result = match cancellable(ctx, session.open_stream()).await {
            Ok(stream) => Ok(stream),
            Err(DomainError::Cancelled) => Err(DomainError::Cancelled),
            Err(e) => {
                debug!(server = %self.target(), error = %e, "Failed to open DoQ stream, re-acquiring session");
                match cancellable(ctx, self.sessions.get_session()).await {
                    Ok(session) => cancellable(ctx, session.open_stream()).await,
                    Err(e) => Err(e),
                }
            }
        };

        result.map_err(|e| match e {
            e @ (DomainError::Cancelled | DomainError::StreamOpenFailed { .. }) => e,
            other => DomainError::StreamOpenFailed {
                server: self.target().to_string(),
                reason: other.to_string(),
            },
        })
    }

    pub fn pool_stats(&self) -> Option<PoolStats> {
        self.sessions.existing_pool().map(|pool| pool.stats())
    }

    /// Closes the cached session; later exchanges dial a new one.
    pub async fn close(&self) {
        self.sessions.close().await;
    }
}

async fn cancellable<T, F>(ctx: &CancellationToken, fut: F) -> Result<T, DomainError>
where
    F: Future<Output = Result<T, DomainError>>,
{
    tokio::select! {
        biased;
        _ = ctx.cancelled() => Err(DomainError::Cancelled),
        result = fut => result,
    }
}

#[async_trait]
impl<C, K> DnsExchanger for DoqClient<C, K>
where
    C: DoqConnector,
    K: MessageCodec<Message = Message>,
{
    async fn exchange(
        &self,
        ctx: &CancellationToken,
        request: &Message,
    ) -> Result<Message, DomainError> {
        self.exchange_context(ctx, request).await
    }

    fn protocol_name(&self) -> &'static str {
        "QUIC"
    }
}
