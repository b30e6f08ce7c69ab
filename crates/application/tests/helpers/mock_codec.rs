use ferrous_doq_application::ports::MessageCodec;
use ferrous_doq_domain::DomainError;
use std::sync::{Arc, Mutex};

/// Identity codec: a message is its own wire form.
///
/// Empty messages fail to encode; empty input or input starting with 0xFF
/// fails to decode.
#[derive(Clone)]
pub struct BytesCodec {
    max_message_size: usize,
    decoded: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl BytesCodec {
    pub fn new(max_message_size: usize) -> Self {
        Self {
            max_message_size,
            decoded: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every byte slice handed to `decode`, in call order.
    pub fn decode_inputs(&self) -> Vec<Vec<u8>> {
        self.decoded.lock().unwrap().clone()
    }
}

impl MessageCodec for BytesCodec {
    type Message = Vec<u8>;

    fn max_message_size(&self) -> usize {
        self.max_message_size
    }

    fn encode(&self, message: &Vec<u8>) -> Result<Vec<u8>, DomainError> {
        if message.is_empty() {
            return Err(DomainError::Encode("empty message".to_string()));
        }
        Ok(message.clone())
    }

    fn decode(&self, bytes: &[u8]) -> Result<Vec<u8>, DomainError> {
        self.decoded.lock().unwrap().push(bytes.to_vec());
        match bytes.first() {
            None => Err(DomainError::Decode("empty response".to_string())),
            Some(0xFF) => Err(DomainError::Decode("malformed header".to_string())),
            Some(_) => Ok(bytes.to_vec()),
        }
    }
}
