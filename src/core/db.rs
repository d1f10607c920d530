use std::time::Duration;

use sqlx::{migrate::Migrator, pool::PoolOptions, Pool, Postgres};

use crate::settings::Config;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Opens the process-wide Postgres pool. Call once at startup and hand the
/// pool to [`crate::AppState`]; close it with [`close_pool`] on shutdown.
pub async fn init_pool(config: &Config) -> anyhow::Result<Pool<Postgres>> {
    let pool = PoolOptions::new()
        .min_connections(5)
        .max_connections(100)
        .idle_timeout(Duration::from_secs(5))
        .connect(&config.database_url)
        .await?;
    Ok(pool)
}

pub async fn close_pool(pool: &Pool<Postgres>) {
    tracing::info!("closing postgres pool");
    pool.close().await;
}
