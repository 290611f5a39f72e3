//! Messages carried by the queue.

use serde::{Deserialize, Serialize};

use crate::domain::orders::records::OrderId;

/// Published once per created order; asks the worker to process it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderMessage {
    pub order_id: OrderId,
}

/// Every message type the queue understands, tagged by `type` in the stored body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    Order(OrderMessage),
}

impl Message {
    #[must_use]
    pub const fn order(order_id: OrderId) -> Self {
        Self::Order(OrderMessage { order_id })
    }

    /// Short name used in logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Order(_) => "order",
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn order_message_body_is_tagged() -> TestResult {
        let body = serde_json::to_value(Message::order(OrderId::from_i64(12)))?;

        assert_eq!(body, json!({ "type": "order", "order_id": 12 }));

        Ok(())
    }

    #[test]
    fn unknown_type_fails_to_decode() {
        let result = serde_json::from_value::<Message>(json!({ "type": "refund", "order_id": 1 }));

        assert!(result.is_err());
    }
}
