mod codec;
mod dns_exchanger;
mod transport;

pub use codec::MessageCodec;
pub use dns_exchanger::DnsExchanger;
pub use transport::{DoqConnector, DoqSession, DoqStream, StreamRead};
