//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{affix_state::inject, prelude::*};

use orderly_app::{
    context::AppContext,
    domain::orders::{
        MockOrdersService,
        records::{OrderId, OrderRecord, OrderStatus},
    },
    messaging::MockMessageBus,
};

use crate::state::State;

pub(crate) fn make_order(id: OrderId, status: OrderStatus) -> OrderRecord {
    OrderRecord {
        id,
        customer_name: "Jan Kowalski".to_string(),
        email: "jan.kowalski@example.com".to_string(),
        products: vec![],
        address: "ul. Warszawska 10, Kraków".to_string(),
        status,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

pub(crate) fn strict_orders_mock() -> MockOrdersService {
    let mut orders = MockOrdersService::new();

    orders.expect_create_order().never();
    orders.expect_get_order().never();
    orders.expect_list_orders().never();
    orders.expect_mark_processed().never();

    orders
}

pub(crate) fn strict_bus_mock() -> MockMessageBus {
    let mut bus = MockMessageBus::new();

    bus.expect_dispatch().never();

    bus
}

pub(crate) fn state_with(orders: MockOrdersService, bus: MockMessageBus) -> Arc<State> {
    State::from_app_context(AppContext {
        orders: Arc::new(orders),
        bus: Arc::new(bus),
    })
}

pub(crate) fn orders_and_bus_service(
    orders: MockOrdersService,
    bus: MockMessageBus,
    route: Router,
) -> Service {
    Service::new(Router::new().hoop(inject(state_with(orders, bus))).push(route))
}

pub(crate) fn orders_service(orders: MockOrdersService, route: Router) -> Service {
    orders_and_bus_service(orders, strict_bus_mock(), route)
}
