//! Get Order Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};

use orderly_app::domain::orders::records::OrderId;

use crate::{
    errors::ApiError,
    extensions::*,
    orders::{errors::into_api_error, models::OrderResponse},
    state::State,
};

/// Get Order Handler
///
/// Returns a single order, including its processing status.
#[endpoint(tags("orders"), summary = "Get Order")]
pub(crate) async fn handler(
    id: PathParam<String>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    // Anything that is not an integer cannot name an order.
    let id = id
        .into_inner()
        .parse::<OrderId>()
        .map_err(|_ignored| ApiError::not_found("Order not found"))?;

    let order = state
        .app
        .orders
        .get_order(id)
        .await
        .map_err(into_api_error)?;

    Ok(Json(order.into()))
}
