//! Test context for service-level integration tests.

use crate::{database::Db, domain::orders::PgOrdersService, messaging::PgTransport};

use super::db::TestDb;

pub struct TestContext {
    pub db: TestDb,
    pub orders: PgOrdersService,
    pub transport: PgTransport,
}

impl TestContext {
    pub async fn new() -> Self {
        let db = TestDb::new().await;
        let pool = db.pool().clone();

        Self {
            orders: PgOrdersService::new(Db::new(pool.clone())),
            transport: PgTransport::new(pool),
            db,
        }
    }
}
