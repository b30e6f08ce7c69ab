//! DNS Message Builder
//!
//! Constructs DNS query messages using `hickory-proto`.

use ferrous_doq_domain::DomainError;
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::{DNSClass, Name, RecordType};
use std::str::FromStr;

/// Builds DNS query messages
pub struct MessageBuilder;

impl MessageBuilder {
    /// Build a standard recursive query
    ///
    /// - Random ID for request/response matching
    /// - RD (Recursion Desired) flag set
    /// - Single question section
    pub fn build_query(domain: &str, record_type: RecordType) -> Result<Message, DomainError> {
        let name = Name::from_str(domain).map_err(|e| {
            DomainError::InvalidDomainName(format!("Invalid domain '{}': {}", domain, e))
        })?;

        let mut query = Query::new();
        query.set_name(name);
        query.set_query_type(record_type);
        query.set_query_class(DNSClass::IN);

        let mut message = Message::new(fastrand::u16(..), MessageType::Query, OpCode::Query);
        message.set_recursion_desired(true);
        message.add_query(query);

        Ok(message)
    }
}
