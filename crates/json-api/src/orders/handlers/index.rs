//! Order Index Handler

use std::sync::Arc;

use salvo::{oapi::extract::QueryParam, prelude::*};

use crate::{
    errors::ApiError,
    extensions::*,
    orders::{errors::into_api_error, models::OrdersPageResponse},
    state::State,
};

/// Order Index Handler
///
/// Returns one page of orders in creation order. `page` and `limit` are
/// read leniently and never below 1.
#[endpoint(tags("orders"), summary = "List Orders")]
pub(crate) async fn handler(
    page: QueryParam<String, false>,
    limit: QueryParam<String, false>,
    depot: &mut Depot,
) -> Result<Json<OrdersPageResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let orders = state
        .app
        .orders
        .list_orders(page_request(page, limit))
        .await
        .map_err(into_api_error)?;

    Ok(Json(orders.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::{Value, json};
    use testresult::TestResult;

    use orderly_app::domain::{
        orders::{
            MockOrdersService, OrdersServiceError,
            records::{OrderId, OrderStatus},
        },
        pagination::{Page, PageRequest},
    };

    use crate::{
        orders::models::PageMeta,
        test_helpers::{make_order, orders_service},
    };

    use super::*;

    fn make_service(orders: MockOrdersService) -> Service {
        orders_service(orders, Router::with_path("api/orders").get(handler))
    }

    fn expect_page(orders: &mut MockOrdersService, expected: PageRequest, total_items: u64) {
        orders
            .expect_list_orders()
            .once()
            .withf(move |request| *request == expected)
            .return_once(move |request| {
                let first = i64::from(request.page() - 1) * i64::from(request.limit()) + 1;
                let last = i64::try_from(total_items)
                    .unwrap_or(i64::MAX)
                    .min(first + i64::from(request.limit()) - 1);

                let items = (first..=last)
                    .map(|id| make_order(OrderId::from_i64(id), OrderStatus::Pending))
                    .collect();

                Ok(Page::new(items, request, total_items))
            });

        orders.expect_get_order().never();
        orders.expect_create_order().never();
        orders.expect_mark_processed().never();
    }

    #[tokio::test]
    async fn test_index_defaults_to_first_page_of_ten() -> TestResult {
        let mut orders = MockOrdersService::new();

        expect_page(&mut orders, PageRequest::new(1, 10), 0);

        let mut res = TestClient::get("http://example.com/api/orders")
            .send(&make_service(orders))
            .await;

        let body: OrdersPageResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert!(body.data.is_empty());
        assert_eq!(
            body.meta,
            PageMeta {
                current_page: 1,
                total_pages: 1,
                total_items: 0,
                items_per_page: 10,
            }
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_index_returns_requested_page() -> TestResult {
        let mut orders = MockOrdersService::new();

        expect_page(&mut orders, PageRequest::new(3, 5), 12);

        let mut res = TestClient::get("http://example.com/api/orders?page=3&limit=5")
            .send(&make_service(orders))
            .await;

        let body: OrdersPageResponse = res.take_json().await?;

        assert_eq!(
            body.data.iter().map(|order| order.id).collect::<Vec<_>>(),
            vec![11, 12]
        );
        assert_eq!(body.meta.total_pages, 3);
        assert_eq!(body.meta.total_items, 12);
        assert_eq!(body.meta.items_per_page, 5);

        Ok(())
    }

    #[tokio::test]
    async fn test_index_coerces_invalid_values_to_one() -> TestResult {
        let mut orders = MockOrdersService::new();

        expect_page(&mut orders, PageRequest::new(1, 1), 3);

        let mut res = TestClient::get("http://example.com/api/orders?page=-2&limit=abc")
            .send(&make_service(orders))
            .await;

        let body: OrdersPageResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.meta.current_page, 1);
        assert_eq!(body.meta.items_per_page, 1);
        assert_eq!(body.meta.total_pages, 3);

        Ok(())
    }

    #[tokio::test]
    async fn test_index_items_omit_updated_at() -> TestResult {
        let mut orders = MockOrdersService::new();

        expect_page(&mut orders, PageRequest::new(1, 10), 1);

        let mut res = TestClient::get("http://example.com/api/orders")
            .send(&make_service(orders))
            .await;

        let body: Value = res.take_json().await?;

        let first = body
            .get("data")
            .and_then(|data| data.get(0))
            .ok_or("expected one order")?;

        assert_eq!(first.get("id"), Some(&json!(1)));
        assert!(first.get("updatedAt").is_none(), "list items omit updatedAt");

        Ok(())
    }

    #[tokio::test]
    async fn test_index_storage_error_returns_500() -> TestResult {
        let source = u8::try_from(256_u16)
            .err()
            .ok_or("expected conversion to fail")?;

        let mut orders = MockOrdersService::new();

        orders
            .expect_list_orders()
            .once()
            .return_once(move |_| Err(OrdersServiceError::InvalidCount(source)));

        let res = TestClient::get("http://example.com/api/orders")
            .send(&make_service(orders))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::INTERNAL_SERVER_ERROR));

        Ok(())
    }
}
