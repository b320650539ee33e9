//! Persistence layer: connection pool, migrations, models and repositories.

use sqlx::postgres::PgPoolOptions;

pub mod error;
pub mod models;
pub mod repositories;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply every pending migration from `crates/db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Whether the permission tables exist and hold at least one row.
///
/// Called once at boot when migrations are not run by this process.
pub async fn permissions_provisioned(pool: &DbPool) -> Result<bool, sqlx::Error> {
    let exists: (bool,) = sqlx::query_as(
        "SELECT to_regclass('public.permissions') IS NOT NULL \
            AND to_regclass('public.permission_user') IS NOT NULL",
    )
    .fetch_one(pool)
    .await?;
    if !exists.0 {
        return Ok(false);
    }
    let seeded: (bool,) = sqlx::query_as("SELECT EXISTS (SELECT 1 FROM permissions)")
        .fetch_one(pool)
        .await?;
    Ok(seeded.0)
}
