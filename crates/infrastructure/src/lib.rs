//! Ferrous DoQ Infrastructure Layer
pub mod dns;

pub use dns::{build_doq_client, HickoryCodec, MessageBuilder, QuicDoqClient};
