use ferrous_doq_domain::DomainError;

/// Wire encoding of DNS messages.
pub trait MessageCodec: Send + Sync {
    type Message: Send + Sync;

    /// Capacity of every response buffer.
    fn max_message_size(&self) -> usize;

    /// Fails with `DomainError::Encode`.
    fn encode(&self, message: &Self::Message) -> Result<Vec<u8>, DomainError>;

    /// Fails with `DomainError::Decode`.
    fn decode(&self, bytes: &[u8]) -> Result<Self::Message, DomainError>;
}
