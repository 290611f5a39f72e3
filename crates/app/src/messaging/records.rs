//! Queued Message Records

use jiff::Timestamp;
use serde_json::Value;

use crate::ids::TypedId;

/// Queued message ID
pub type MessageId = TypedId<QueuedMessage>;

/// A message leased to a worker for one delivery attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub id: MessageId,
    pub body: Value,

    /// Deliveries so far, including this one.
    pub attempts: u32,
}

/// A row of the message table.
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedMessage {
    pub id: MessageId,
    pub queue_name: String,
    pub body: Value,
    pub attempts: u32,
    pub last_error: Option<String>,
    pub created_at: Timestamp,
    pub available_at: Timestamp,
    pub processed_at: Option<Timestamp>,
    pub failed_at: Option<Timestamp>,
}
