//! Database connection wiring: open the configured pool, apply the schema,
//! hand back a ready store.

use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::config::DatabaseConfig;
use crate::store::{PostgresUserStore, SqliteUserStore, UserStore};

/// Connect to the configured database and make sure the `users` table exists.
pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<Arc<dyn UserStore>> {
    let store: Arc<dyn UserStore> = match config {
        DatabaseConfig::Postgres { url, max_connections } => {
            let pool = PgPoolOptions::new()
                .max_connections(*max_connections)
                .connect(url)
                .await
                .context("failed to connect to postgres")?;

            let store = PostgresUserStore::new(pool);
            store.migrate().await.context("failed to migrate postgres schema")?;
            Arc::new(store)
        }
        DatabaseConfig::Sqlite { path, max_connections } => {
            let options = SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true);
            let pool = SqlitePoolOptions::new()
                .max_connections(*max_connections)
                .connect_with(options)
                .await
                .with_context(|| format!("failed to open sqlite database at {}", path.display()))?;

            let store = SqliteUserStore::new(pool);
            store.migrate().await.context("failed to migrate sqlite schema")?;
            Arc::new(store)
        }
    };

    tracing::info!(backend = store.backend(), "database connected and migrated");
    Ok(store)
}
