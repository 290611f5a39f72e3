//! Message handlers.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use crate::{
    domain::orders::{OrdersService, OrdersServiceError},
    messaging::{
        errors::HandlerError,
        message::{Message, OrderMessage},
    },
};

#[automock]
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// Process one delivered message.
    async fn handle(&self, message: Message) -> Result<(), HandlerError>;
}

/// Marks the order named by an [`OrderMessage`] as processed.
#[derive(Clone)]
pub struct OrderMessageHandler {
    orders: Arc<dyn OrdersService>,
}

impl std::fmt::Debug for OrderMessageHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderMessageHandler").finish_non_exhaustive()
    }
}

impl OrderMessageHandler {
    #[must_use]
    pub fn new(orders: Arc<dyn OrdersService>) -> Self {
        Self { orders }
    }
}

#[async_trait]
impl MessageHandler for OrderMessageHandler {
    async fn handle(&self, message: Message) -> Result<(), HandlerError> {
        let Message::Order(OrderMessage { order_id }) = message;

        let order = self
            .orders
            .mark_processed(order_id)
            .await
            .map_err(|error| match error {
                OrdersServiceError::NotFound => HandlerError::OrderNotFound(order_id),
                other => HandlerError::Orders(other),
            })?;

        info!(order_id = %order.id, status = %order.status, "order processed");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use crate::domain::orders::{
        MockOrdersService,
        records::{OrderId, OrderRecord, OrderStatus},
    };

    use super::*;

    fn processed_order(id: OrderId) -> OrderRecord {
        OrderRecord {
            id,
            customer_name: "Jan Kowalski".to_string(),
            email: "jan.kowalski@example.com".to_string(),
            products: vec![],
            address: "ul. Warszawska 10, Kraków".to_string(),
            status: OrderStatus::Processed,
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        }
    }

    #[tokio::test]
    async fn marks_order_processed() {
        let id = OrderId::from_i64(3);
        let mut orders = MockOrdersService::new();

        orders
            .expect_mark_processed()
            .once()
            .withf(move |order| *order == id)
            .return_once(move |_| Ok(processed_order(id)));

        orders.expect_get_order().never();
        orders.expect_create_order().never();
        orders.expect_list_orders().never();

        let handler = OrderMessageHandler::new(Arc::new(orders));

        let result = handler.handle(Message::order(id)).await;

        assert!(result.is_ok(), "expected Ok, got {result:?}");
    }

    #[tokio::test]
    async fn missing_order_fails_the_message() {
        let id = OrderId::from_i64(404);
        let mut orders = MockOrdersService::new();

        orders
            .expect_mark_processed()
            .once()
            .return_once(|_| Err(OrdersServiceError::NotFound));

        let handler = OrderMessageHandler::new(Arc::new(orders));

        let result = handler.handle(Message::order(id)).await;

        assert!(
            matches!(result, Err(HandlerError::OrderNotFound(failed)) if failed == id),
            "expected OrderNotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn storage_errors_are_passed_through() {
        let mut orders = MockOrdersService::new();

        orders
            .expect_mark_processed()
            .once()
            .return_once(|_| Err(OrdersServiceError::Sql(sqlx::Error::PoolTimedOut)));

        let handler = OrderMessageHandler::new(Arc::new(orders));

        let result = handler.handle(Message::order(OrderId::from_i64(1))).await;

        assert!(
            matches!(result, Err(HandlerError::Orders(OrdersServiceError::Sql(_)))),
            "expected Orders(Sql), got {result:?}"
        );
    }
}
