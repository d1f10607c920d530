use sqlx::{migrate::Migrate, PgPool};

use crate::core::db::MIGRATOR;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    pub version: i64,
    pub description: String,
    pub applied: bool,
}

/// Every embedded migration with whether it has been applied.
pub async fn db_list(pool: &PgPool) -> anyhow::Result<Vec<MigrationStatus>> {
    let mut conn = pool.acquire().await?;
    conn.ensure_migrations_table().await?;
    let applied = conn.list_applied_migrations().await?;
    let data = MIGRATOR
        .iter()
        .filter(|x| !x.migration_type.is_down_migration())
        .map(|x| MigrationStatus {
            version: x.version,
            description: x.description.to_string(),
            applied: applied.iter().any(|y| y.version == x.version),
        })
        .collect();
    Ok(data)
}

pub async fn db_migrate(pool: &PgPool) -> anyhow::Result<()> {
    MIGRATOR.run(pool).await?;
    Ok(())
}

/// Reverts the latest applied migration. Returns its version, or `None` when
/// nothing was applied.
pub async fn db_revert(pool: &PgPool) -> anyhow::Result<Option<i64>> {
    let mut conn = pool.acquire().await?;
    conn.ensure_migrations_table().await?;
    let mut applied: Vec<i64> = conn
        .list_applied_migrations()
        .await?
        .into_iter()
        .map(|x| x.version)
        .collect();
    drop(conn);
    applied.sort_unstable();
    let Some(latest) = applied.pop() else {
        return Ok(None);
    };
    let target = applied.last().copied().unwrap_or(0);
    MIGRATOR.undo(pool, target).await?;
    Ok(Some(latest))
}
