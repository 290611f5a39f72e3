//! Order request and response bodies.

use jiff::Timestamp;
use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};

use orderly_app::domain::{
    orders::{
        data::{NewOrder, Products},
        records::OrderRecord,
    },
    pagination::Page,
};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn format_timestamp(timestamp: Timestamp) -> String {
    timestamp.strftime(TIMESTAMP_FORMAT).to_string()
}

/// Create Order Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateOrderRequest {
    /// Name of the customer placing the order
    pub customer_name: String,

    /// Customer contact email
    pub email: String,

    /// Ordered product lines, stored as given
    #[salvo(schema(value_type = Vec<Object>))]
    pub products: Products,

    /// Delivery address
    pub address: String,
}

impl From<CreateOrderRequest> for NewOrder {
    fn from(request: CreateOrderRequest) -> Self {
        NewOrder {
            customer_name: request.customer_name,
            email: request.email,
            products: request.products,
            address: request.address,
        }
    }
}

/// Order Created Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderCreatedResponse {
    /// Confirmation message
    pub message: String,

    /// Identifier of the created order
    pub order_id: i64,
}

/// Order Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderResponse {
    /// The unique identifier of the order
    pub id: i64,

    pub customer_name: String,
    pub email: String,

    #[salvo(schema(value_type = Vec<Object>))]
    pub products: Products,

    pub address: String,

    /// `pending` until the order message has been processed, then `processed`
    pub status: String,

    /// Creation time, `YYYY-MM-DD HH:MM:SS` in UTC
    pub created_at: String,

    /// Last status change, `YYYY-MM-DD HH:MM:SS` in UTC
    pub updated_at: String,
}

impl From<OrderRecord> for OrderResponse {
    fn from(order: OrderRecord) -> Self {
        OrderResponse {
            id: order.id.into_i64(),
            customer_name: order.customer_name,
            email: order.email,
            products: order.products,
            address: order.address,
            status: order.status.to_string(),
            created_at: format_timestamp(order.created_at),
            updated_at: format_timestamp(order.updated_at),
        }
    }
}

/// Order list entry
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderSummaryResponse {
    pub id: i64,
    pub customer_name: String,
    pub email: String,

    #[salvo(schema(value_type = Vec<Object>))]
    pub products: Products,

    pub address: String,
    pub status: String,
    pub created_at: String,
}

impl From<OrderRecord> for OrderSummaryResponse {
    fn from(order: OrderRecord) -> Self {
        OrderSummaryResponse {
            id: order.id.into_i64(),
            customer_name: order.customer_name,
            email: order.email,
            products: order.products,
            address: order.address,
            status: order.status.to_string(),
            created_at: format_timestamp(order.created_at),
        }
    }
}

/// Pagination metadata
#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PageMeta {
    /// The requested page
    pub current_page: u32,

    /// Number of pages, at least 1
    pub total_pages: u64,

    /// Number of orders across all pages
    pub total_items: u64,

    /// Page size
    pub items_per_page: u32,
}

/// Orders Page Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrdersPageResponse {
    /// Orders on the requested page
    pub data: Vec<OrderSummaryResponse>,

    /// Pagination metadata
    pub meta: PageMeta,
}

impl From<Page<OrderRecord>> for OrdersPageResponse {
    fn from(page: Page<OrderRecord>) -> Self {
        let meta = PageMeta {
            current_page: page.request.page(),
            total_pages: page.total_pages(),
            total_items: page.total_items,
            items_per_page: page.request.limit(),
        };

        OrdersPageResponse {
            data: page.map(Into::into).items,
            meta,
        }
    }
}
