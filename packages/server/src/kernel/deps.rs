//! Server dependencies shared by every request handler.

use sqlx::PgPool;

use super::PgStore;

/// Server dependencies accessible to handlers
#[derive(Clone)]
pub struct ServerDeps {
    pub db_pool: PgPool,
    pub store: PgStore,
}

impl ServerDeps {
    pub fn new(db_pool: PgPool) -> Self {
        let store = PgStore::new(db_pool.clone());
        Self { db_pool, store }
    }
}
