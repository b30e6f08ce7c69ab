pub mod codec;
pub mod doq_client;
pub mod message_builder;
pub mod transport;

pub use codec::HickoryCodec;
pub use doq_client::{build_doq_client, QuicDoqClient};
pub use message_builder::MessageBuilder;
pub use transport::quic::{QuicConnector, QuicSession, QuicStream};
pub use transport::tls::TlsSessionCache;
