//! Database connection management

use sqlx::{
    PgPool, Postgres, Transaction,
    migrate::{MigrateError, Migrator},
    postgres::PgPoolOptions,
};
use thiserror::Error;
use tracing::info;

static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

#[derive(Debug, Error)]
pub enum DatabaseInitError {
    #[error("failed to connect to database")]
    Connect(#[source] sqlx::Error),

    #[error("failed to run database migrations")]
    Migrate(#[source] MigrateError),
}

/// Connection settings shared by the API server and the CLI.
#[derive(Debug, Clone)]
pub struct DatabaseOptions {
    pub url: String,
    pub max_connections: u32,
    pub run_migrations: bool,
}

#[derive(Debug, Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect, optionally migrate, and wrap the resulting pool.
    ///
    /// # Errors
    ///
    /// Returns an error when the connection or a migration fails.
    pub async fn init(options: &DatabaseOptions) -> Result<Self, DatabaseInitError> {
        let pool = PgPoolOptions::new()
            .max_connections(options.max_connections)
            .connect(&options.url)
            .await
            .map_err(DatabaseInitError::Connect)?;

        if options.run_migrations {
            migrate(&pool).await?;
        }

        Ok(Self::new(pool))
    }

    /// Begin a transaction on the shared pool.
    ///
    /// # Errors
    ///
    /// Returns an error when a connection cannot be acquired.
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Connect to `PostgreSQL`.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPool::connect(database_url).await
}

/// Apply any pending migrations from `migrations/`.
///
/// # Errors
///
/// Returns an error if a migration fails to apply.
pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseInitError> {
    MIGRATOR.run(pool).await.map_err(DatabaseInitError::Migrate)?;

    info!("database migrations applied");

    Ok(())
}
