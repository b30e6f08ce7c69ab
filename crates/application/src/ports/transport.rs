use async_trait::async_trait;
use ferrous_doq_domain::DomainError;

/// Dials secure multiplexed sessions to one fixed target.
#[async_trait]
pub trait DoqConnector: Send + Sync {
    type Session: DoqSession;

    async fn dial(&self) -> Result<Self::Session, DomainError>;

    /// Address used in error messages and logs.
    fn target(&self) -> &str;
}

/// Handle to an established session. Clones refer to the same connection.
#[async_trait]
pub trait DoqSession: Clone + Send + Sync + 'static {
    type Stream: DoqStream;

    async fn open_stream(&self) -> Result<Self::Stream, DomainError>;

    /// Whether the session's lifetime has already ended. Must not block.
    fn is_closed(&self) -> bool;

    /// Best-effort close; never fails.
    fn close(&self);
}

/// Result of reading a response: the number of bytes placed in the buffer,
/// and the error that ended the read, if any. Both may be set at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamRead {
    pub len: usize,
    pub error: Option<DomainError>,
}

impl StreamRead {
    pub fn complete(len: usize) -> Self {
        Self { len, error: None }
    }

    pub fn failed(len: usize, error: DomainError) -> Self {
        Self {
            len,
            error: Some(error),
        }
    }
}

/// One bidirectional stream, used for exactly one query.
#[async_trait]
pub trait DoqStream: Send {
    async fn write_all(&mut self, bytes: &[u8]) -> Result<(), DomainError>;

    /// Half-closes the write direction (STREAM FIN); reading stays possible.
    fn finish(&mut self) -> Result<(), DomainError>;

    async fn read(&mut self, buf: &mut [u8]) -> StreamRead;
}
