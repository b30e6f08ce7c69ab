use async_trait::async_trait;
use ferrous_doq_domain::DomainError;
use hickory_proto::op::Message;
use tokio_util::sync::CancellationToken;

/// Upstream that answers one DNS message per call.
#[async_trait]
pub trait DnsExchanger: Send + Sync {
    async fn exchange(
        &self,
        ctx: &CancellationToken,
        request: &Message,
    ) -> Result<Message, DomainError>;

    fn protocol_name(&self) -> &'static str;
}
