//! PostgreSQL persistence for the project state service.
//!
//! - [`models`] -- `FromRow` row structs and their conversions into core types.
//! - [`repositories`] -- zero-sized repositories with async query methods.
//! - [`PgStatePersistence`] -- the [`StatePersistence`] implementation the
//!   API server runs against.
//!
//! [`StatePersistence`]: hexrfp_core::persistence::StatePersistence

use sqlx::postgres::PgPoolOptions;

pub mod models;
pub mod persistence;
pub mod repositories;

pub use persistence::PgStatePersistence;

pub type DbPool = sqlx::PgPool;

/// Default upper bound on pooled connections.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 20;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Verify the database answers a trivial query.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply all pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}
