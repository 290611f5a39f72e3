//! Order Errors

use tracing::error;

use orderly_app::domain::orders::OrdersServiceError;

use crate::errors::ApiError;

pub(crate) fn into_api_error(error: OrdersServiceError) -> ApiError {
    match error {
        OrdersServiceError::NotFound => ApiError::not_found("Order not found"),
        OrdersServiceError::Validation(violations) => ApiError::bad_request(violations.to_string()),
        OrdersServiceError::MissingRequiredData | OrdersServiceError::InvalidData => {
            ApiError::invalid_input()
        }
        OrdersServiceError::Sql(source) => {
            error!("orders storage failure: {source}");

            ApiError::internal()
        }
        OrdersServiceError::InvalidCount(source) => {
            error!("invalid order count: {source}");

            ApiError::internal()
        }
    }
}
