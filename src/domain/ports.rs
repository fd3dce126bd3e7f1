use crate::domain::model::{AdapterError, ApplicationAttempt, Channel, Company, Delivery, OutreachContent};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Capability to deliver rendered content to a company over one channel.
///
/// Adapters classify their own failures (`Retryable` vs `Fatal`); the engine's
/// state machine stays channel-agnostic and only sequences attempts.
#[async_trait]
pub trait ChannelAdapter: Send + Sync {
    fn channel(&self) -> Channel;

    async fn deliver(
        &self,
        company: &Company,
        content: &OutreachContent,
    ) -> std::result::Result<Delivery, AdapterError>;
}

/// Append-only audit log. The sole source of truth for idempotency.
///
/// `append` must make the record durable before returning; an error here is
/// fatal to the whole run.
pub trait AttemptLog: Send {
    fn append(&mut self, attempt: &ApplicationAttempt) -> Result<()>;

    fn flush(&mut self) -> Result<()>;
}
