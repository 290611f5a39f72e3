//! Orders service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::{
        orders::{
            data::NewOrder,
            errors::OrdersServiceError,
            records::{OrderId, OrderRecord, OrderStatus},
            repository::PgOrdersRepository,
        },
        pagination::{Page, PageRequest},
    },
};

#[derive(Debug, Clone)]
pub struct PgOrdersService {
    db: Db,
    repository: PgOrdersRepository,
}

impl PgOrdersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgOrdersRepository::new(),
        }
    }
}

#[async_trait]
impl OrdersService for PgOrdersService {
    async fn create_order(&self, order: NewOrder) -> Result<OrderRecord, OrdersServiceError> {
        order.validate()?;

        let mut tx = self.db.begin().await?;

        let created = self.repository.create_order(&mut tx, &order).await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn get_order(&self, order: OrderId) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let order = self.repository.get_order(&mut tx, order).await?;

        tx.commit().await?;

        Ok(order)
    }

    async fn list_orders(
        &self,
        request: PageRequest,
    ) -> Result<Page<OrderRecord>, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let total_items = u64::try_from(self.repository.count_orders(&mut tx).await?)?;

        let orders = if request.offset() >= total_items {
            Vec::new()
        } else {
            self.repository
                .list_orders(&mut tx, request.limit(), request.offset())
                .await?
        };

        tx.commit().await?;

        Ok(Page::new(orders, request, total_items))
    }

    async fn mark_processed(&self, order: OrderId) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let updated = self
            .repository
            .update_order_status(&mut tx, order, OrderStatus::Processed)
            .await?;

        tx.commit().await?;

        Ok(updated)
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Validates and stores a new pending order.
    async fn create_order(&self, order: NewOrder) -> Result<OrderRecord, OrdersServiceError>;

    /// Retrieve a single order.
    async fn get_order(&self, order: OrderId) -> Result<OrderRecord, OrdersServiceError>;

    /// Retrieves one page of orders in ascending id order.
    async fn list_orders(
        &self,
        request: PageRequest,
    ) -> Result<Page<OrderRecord>, OrdersServiceError>;

    /// Moves an order to the processed state.
    async fn mark_processed(&self, order: OrderId) -> Result<OrderRecord, OrdersServiceError>;
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use crate::test::TestContext;

    use super::*;

    fn new_order(name: &str) -> NewOrder {
        NewOrder {
            customer_name: name.to_string(),
            email: "jan.kowalski@example.com".to_string(),
            products: vec![json!({ "id": 1, "quantity": 2 })],
            address: "ul. Warszawska 10, Kraków".to_string(),
        }
    }

    #[tokio::test]
    async fn create_order_assigns_positive_id_and_pending_status() -> TestResult {
        let ctx = TestContext::new().await;

        let order = ctx.orders.create_order(new_order("Jan Kowalski")).await?;

        assert!(order.id.into_i64() > 0, "expected a positive id");
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.customer_name, "Jan Kowalski");
        assert_eq!(order.created_at, order.updated_at);

        Ok(())
    }

    #[tokio::test]
    async fn get_order_returns_created_order() -> TestResult {
        let ctx = TestContext::new().await;

        let created = ctx.orders.create_order(new_order("Jan Kowalski")).await?;
        let fetched = ctx.orders.get_order(created.id).await?;

        assert_eq!(fetched, created);
        assert_eq!(fetched.products.len(), 1);
        assert_eq!(fetched.products[0].get("quantity"), Some(&json!(2)));

        Ok(())
    }

    #[tokio::test]
    async fn products_are_stored_as_jsonb_array() -> TestResult {
        let ctx = TestContext::new().await;

        let created = ctx.orders.create_order(new_order("Jan Kowalski")).await?;

        let stored: serde_json::Value =
            sqlx::query_scalar("SELECT products FROM orders WHERE id = $1")
                .bind(created.id.into_i64())
                .fetch_one(ctx.db.pool())
                .await?;

        assert_eq!(stored, json!([{ "id": 1, "quantity": 2 }]));

        Ok(())
    }

    #[tokio::test]
    async fn get_order_unknown_id_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.orders.get_order(OrderId::from_i64(999_999)).await;

        assert!(
            matches!(result, Err(OrdersServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn create_order_rejects_blank_address() {
        let ctx = TestContext::new().await;

        let result = ctx
            .orders
            .create_order(NewOrder {
                address: " ".to_string(),
                ..new_order("Jan Kowalski")
            })
            .await;

        assert!(
            matches!(result, Err(OrdersServiceError::Validation(_))),
            "expected Validation, got {result:?}"
        );
    }

    #[tokio::test]
    async fn list_orders_paginates_in_insertion_order() -> TestResult {
        let ctx = TestContext::new().await;

        let mut ids = Vec::new();

        for i in 1..=12 {
            let order = ctx
                .orders
                .create_order(new_order(&format!("Customer {i}")))
                .await?;

            ids.push(order.id);
        }

        let first = ctx.orders.list_orders(PageRequest::new(1, 5)).await?;
        let last = ctx.orders.list_orders(PageRequest::new(3, 5)).await?;

        assert_eq!(first.total_items, 12);
        assert_eq!(first.total_pages(), 3);
        assert_eq!(
            first.items.iter().map(|o| o.id).collect::<Vec<_>>(),
            ids[..5].to_vec()
        );
        assert_eq!(
            last.items.iter().map(|o| o.id).collect::<Vec<_>>(),
            ids[10..].to_vec()
        );

        Ok(())
    }

    #[tokio::test]
    async fn list_orders_beyond_last_page_is_empty() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.orders.create_order(new_order("Jan Kowalski")).await?;

        let page = ctx.orders.list_orders(PageRequest::new(4, 10)).await?;

        assert!(page.items.is_empty());
        assert_eq!(page.total_items, 1);
        assert_eq!(page.total_pages(), 1);
        assert_eq!(page.request.page(), 4);

        Ok(())
    }

    #[tokio::test]
    async fn list_orders_with_saturated_page_and_limit_is_empty() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.orders.create_order(new_order("Jan Kowalski")).await?;

        let page = ctx
            .orders
            .list_orders(PageRequest::new(u32::MAX, u32::MAX))
            .await?;

        assert!(page.items.is_empty());
        assert_eq!(page.total_items, 1);
        assert_eq!(page.total_pages(), 1);
        assert_eq!(page.request.page(), u32::MAX);

        Ok(())
    }

    #[tokio::test]
    async fn list_orders_with_huge_limit_returns_everything() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.orders.create_order(new_order("Jan Kowalski")).await?;
        ctx.orders.create_order(new_order("Anna Nowak")).await?;

        let page = ctx
            .orders
            .list_orders(PageRequest::new(1, u32::MAX))
            .await?;

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total_pages(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn scalar_product_items_round_trip() -> TestResult {
        let ctx = TestContext::new().await;

        let created = ctx
            .orders
            .create_order(NewOrder {
                products: vec![json!("sku-1"), json!(2)],
                ..new_order("Jan Kowalski")
            })
            .await?;

        let fetched = ctx.orders.get_order(created.id).await?;

        assert_eq!(fetched.products, vec![json!("sku-1"), json!(2)]);

        Ok(())
    }

    #[tokio::test]
    async fn list_orders_empty_when_none_created() -> TestResult {
        let ctx = TestContext::new().await;

        let page = ctx.orders.list_orders(PageRequest::default()).await?;

        assert!(page.items.is_empty());
        assert_eq!(page.total_items, 0);

        Ok(())
    }

    #[tokio::test]
    async fn mark_processed_changes_status() -> TestResult {
        let ctx = TestContext::new().await;

        let created = ctx.orders.create_order(new_order("Jan Kowalski")).await?;
        let processed = ctx.orders.mark_processed(created.id).await?;

        assert_eq!(processed.id, created.id);
        assert_eq!(processed.status, OrderStatus::Processed);
        assert_eq!(processed.customer_name, created.customer_name);
        assert!(processed.updated_at >= created.updated_at);

        let fetched = ctx.orders.get_order(created.id).await?;

        assert_eq!(fetched.status, OrderStatus::Processed);

        Ok(())
    }

    #[tokio::test]
    async fn mark_processed_twice_keeps_first_update_time() -> TestResult {
        let ctx = TestContext::new().await;

        let created = ctx.orders.create_order(new_order("Jan Kowalski")).await?;
        let first = ctx.orders.mark_processed(created.id).await?;
        let second = ctx.orders.mark_processed(created.id).await?;

        assert_eq!(second.status, OrderStatus::Processed);
        assert_eq!(second.updated_at, first.updated_at);

        Ok(())
    }

    #[tokio::test]
    async fn mark_processed_unknown_id_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.orders.mark_processed(OrderId::from_i64(999_999)).await;

        assert!(
            matches!(result, Err(OrdersServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }
}
