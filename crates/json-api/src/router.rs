//! App Router

use salvo::Router;

use crate::{healthcheck, observability::metrics_handler, orders};

/// Routes served under `/api`.
pub(crate) fn api_router() -> Router {
    Router::with_path("api").push(
        Router::with_path("orders")
            .get(orders::index::handler)
            .post(orders::create::handler)
            .push(Router::with_path("{id}").get(orders::get::handler)),
    )
}

/// Operational routes kept out of the OpenAPI document.
pub(crate) fn ops_router() -> Router {
    Router::new()
        .push(Router::with_path("healthcheck").get(healthcheck::handler))
        .push(Router::with_path("metrics").get(metrics_handler))
}
