//! Postgres connectivity for the catalog: pool factory, module migrations and
//! the storage error type shared by every repository implementation.

mod error;
mod migrate;

use std::time::Duration;

use anyhow::Context;
use catalog_kernel::settings::DatabaseSettings;
use sqlx::postgres::{PgPool, PgPoolOptions};

pub use error::{map_sqlx_error, StoreError};
pub use migrate::{migrate, MIGRATIONS_TABLE};

/// Open a connection pool using the configured database settings.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<PgPool> {
    tracing::info!(
        target: "catalog-db",
        max_connections = settings.max_connections,
        "connecting to postgres"
    );

    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
        .connect(&settings.url)
        .await
        .context("failed to create postgres pool")
}

/// Round-trip a trivial query to confirm the pool is usable.
pub async fn ping(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map_err(map_sqlx_error)?;
    Ok(())
}
