//! App Context

use std::sync::Arc;

use crate::{
    database::Db,
    domain::orders::{OrdersService, PgOrdersService},
    messaging::{MessageBus, PgMessageBus, PgTransport},
};

#[derive(Clone)]
pub struct AppContext {
    pub orders: Arc<dyn OrdersService>,
    pub bus: Arc<dyn MessageBus>,
}

impl AppContext {
    /// Wire the `PostgreSQL`-backed services onto one pool.
    #[must_use]
    pub fn from_db(db: &Db, queue: &str) -> Self {
        let transport = PgTransport::new(db.pool().clone());

        Self {
            orders: Arc::new(PgOrdersService::new(db.clone())),
            bus: Arc::new(PgMessageBus::new(transport, queue)),
        }
    }
}
