use super::buffer_pool::BufferPool;
use super::liveness;
use crate::ports::{DoqConnector, DoqSession};
use ferrous_doq_domain::DomainError;
use std::sync::{Arc, OnceLock};
use tokio::sync::RwLock;
use tracing::{debug, warn};

const MAX_IDLE_BUFFERS: usize = 64;

/// Owns the client's cached session and its response buffer pool.
///
/// Reuse of a live session only takes the shared lock. Replacement and pool
/// creation take the exclusive lock. Once created, the pool is read without
/// the lock.
pub struct SessionManager<C: DoqConnector> {
    connector: C,
    session: RwLock<Option<C::Session>>,
    bytes_pool: OnceLock<Arc<BufferPool>>,
    buffer_size: usize,
}

impl<C: DoqConnector> SessionManager<C> {
    pub fn new(connector: C, buffer_size: usize) -> Self {
        Self {
            connector,
            session: RwLock::new(None),
            bytes_pool: OnceLock::new(),
            buffer_size,
        }
    }

    pub fn target(&self) -> &str {
        self.connector.target()
    }

    /// Returns the cached session if it is still active, otherwise dials a new one.
    ///
    /// Callers that see the same stale session at once each dial; the last
    /// one to store wins and the other sessions are left to their idle timeout.
    pub async fn get_session(&self) -> Result<C::Session, DomainError> {
        {
            let cached = self.session.read().await;
            if let Some(session) = cached.as_ref() {
                if liveness::is_active(session) {
                    return Ok(session.clone());
                }
                debug!(server = %self.target(), "Cached QUIC session is closed, recreating");
                session.close();
            }
        }

        let mut cached = self.session.write().await;
        let session = self.dial_with_retry().await?;
        *cached = Some(session.clone());
        Ok(session)
    }

    /// Dials, and dials exactly once more if the first attempt fails.
    async fn dial_with_retry(&self) -> Result<C::Session, DomainError> {
        match self.connector.dial().await {
            Ok(session) => Ok(session),
            Err(e) => {
                warn!(server = %self.target(), error = %e, "QUIC session dial failed, retrying once");
                self.connector.dial().await
            }
        }
    }

    /// Pool of response buffers, created on first use.
    pub async fn bytes_pool(&self) -> Arc<BufferPool> {
        if let Some(pool) = self.bytes_pool.get() {
            return Arc::clone(pool);
        }

        let _exclusive = self.session.write().await;
        let buffer_size = self.buffer_size;
        Arc::clone(
            self.bytes_pool
                .get_or_init(|| Arc::new(BufferPool::new(buffer_size, MAX_IDLE_BUFFERS))),
        )
    }

    /// Session currently cached, whether or not it is still active.
    pub async fn cached_session(&self) -> Option<C::Session> {
        self.session.read().await.clone()
    }

    /// Pool if it has been created already.
    pub fn existing_pool(&self) -> Option<Arc<BufferPool>> {
        self.bytes_pool.get().cloned()
    }

    /// Closes and forgets the cached session. The next exchange dials again.
    pub async fn close(&self) {
        if let Some(session) = self.session.write().await.take() {
            debug!(server = %self.target(), "Closing QUIC session");
            session.close();
        }
    }
}
