//! Message bus.

use async_trait::async_trait;
use mockall::automock;
use tracing::debug;

use crate::messaging::{
    errors::MessengerError, message::Message, records::MessageId, transport::PgTransport,
};

#[derive(Debug, Clone)]
pub struct PgMessageBus {
    transport: PgTransport,
    queue: String,
}

impl PgMessageBus {
    #[must_use]
    pub fn new(transport: PgTransport, queue: impl Into<String>) -> Self {
        Self {
            transport,
            queue: queue.into(),
        }
    }
}

#[async_trait]
impl MessageBus for PgMessageBus {
    async fn dispatch(&self, message: Message) -> Result<MessageId, MessengerError> {
        let body = serde_json::to_value(&message).map_err(MessengerError::Encode)?;

        let id = self.transport.send(&self.queue, &body).await?;

        debug!(message_id = %id, kind = message.kind(), queue = %self.queue, "message dispatched");

        Ok(id)
    }
}

#[automock]
#[async_trait]
pub trait MessageBus: Send + Sync {
    /// Enqueue a message for asynchronous handling.
    async fn dispatch(&self, message: Message) -> Result<MessageId, MessengerError>;
}
