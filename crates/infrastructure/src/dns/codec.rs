use ferrous_doq_application::ports::MessageCodec;
use ferrous_doq_domain::{DomainError, MAX_DNS_MESSAGE_SIZE};
use hickory_proto::op::Message;
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};

/// DNS wire format via `hickory-proto`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HickoryCodec;

impl MessageCodec for HickoryCodec {
    type Message = Message;

    fn max_message_size(&self) -> usize {
        MAX_DNS_MESSAGE_SIZE
    }

    fn encode(&self, message: &Message) -> Result<Vec<u8>, DomainError> {
        let mut buf = Vec::with_capacity(512);
        let mut encoder = BinEncoder::new(&mut buf);

        message
            .emit(&mut encoder)
            .map_err(|e| DomainError::Encode(e.to_string()))?;

        Ok(buf)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Message, DomainError> {
        Message::from_vec(bytes).map_err(|e| DomainError::Decode(e.to_string()))
    }
}
