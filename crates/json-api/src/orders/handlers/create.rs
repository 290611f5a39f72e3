//! Create Order Handler

use std::sync::Arc;

use salvo::{http::header::LOCATION, prelude::*};
use tracing::debug;

use orderly_app::messaging::Message;

use crate::{
    errors::ApiError,
    extensions::*,
    orders::{
        errors::into_api_error,
        models::{CreateOrderRequest, OrderCreatedResponse},
    },
    state::State,
};

/// Create Order Handler
///
/// Stores a pending order and queues it for processing.
#[endpoint(
    tags("orders"),
    summary = "Create Order",
    request_body = CreateOrderRequest,
    responses(
        (status_code = StatusCode::CREATED, description = "Order created"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid input data"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal server error"),
    ),
)]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<OrderCreatedResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let payload = req.payload().await.map_err(|error| {
        debug!("could not read order payload: {error}");

        ApiError::invalid_input()
    })?;

    let request = serde_json::from_slice::<CreateOrderRequest>(payload).map_err(|error| {
        debug!("could not decode order payload: {error}");

        ApiError::invalid_input()
    })?;

    let order = state
        .app
        .orders
        .create_order(request.into())
        .await
        .map_err(into_api_error)?;

    // The order is already stored; a failed publish leaves it pending.
    state
        .app
        .bus
        .dispatch(Message::order(order.id))
        .await
        .or_500("failed to publish order message")?;

    res.add_header(LOCATION, format!("/api/orders/{}", order.id), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(OrderCreatedResponse {
        message: "Order created successfully".to_string(),
        order_id: order.id.into_i64(),
    }))
}
