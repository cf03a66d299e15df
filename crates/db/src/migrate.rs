use anyhow::Context;
use catalog_kernel::Migration;
use sqlx::PgPool;

/// Bookkeeping table recording which module migrations have run.
pub const MIGRATIONS_TABLE: &str = "_catalog_migrations";

/// Apply pending module migrations in the given order.
///
/// Each migration runs in its own transaction together with its bookkeeping
/// row, so a failed migration leaves no partial record behind.
pub async fn migrate(pool: &PgPool, migrations: &[(String, Migration)]) -> anyhow::Result<usize> {
    sqlx::query(&format!(
        "CREATE TABLE IF NOT EXISTS {MIGRATIONS_TABLE} (
            module     TEXT        NOT NULL,
            id         TEXT        NOT NULL,
            applied_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            PRIMARY KEY (module, id)
        )"
    ))
    .execute(pool)
    .await
    .context("failed to create migrations table")?;

    let mut applied = 0;

    for (module, migration) in migrations {
        let already: Option<String> = sqlx::query_scalar(&format!(
            "SELECT id FROM {MIGRATIONS_TABLE} WHERE module = $1 AND id = $2"
        ))
        .bind(module)
        .bind(migration.id)
        .fetch_optional(pool)
        .await
        .with_context(|| format!("failed to read migration state for {module}/{}", migration.id))?;

        if already.is_some() {
            tracing::debug!(module = %module, migration = migration.id, "migration already applied");
            continue;
        }

        let mut tx = pool.begin().await.context("failed to open migration transaction")?;

        sqlx::raw_sql(migration.up)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("migration {module}/{} failed", migration.id))?;

        sqlx::query(&format!(
            "INSERT INTO {MIGRATIONS_TABLE} (module, id) VALUES ($1, $2)"
        ))
        .bind(module)
        .bind(migration.id)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("failed to record migration {module}/{}", migration.id))?;

        tx.commit().await.context("failed to commit migration")?;

        tracing::info!(module = %module, migration = migration.id, "migration applied");
        applied += 1;
    }

    Ok(applied)
}
