use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;

use super::{StoreError, StoreResult};
use crate::config::DatabaseConfig;

/// Connection pool setup and maintenance for the PostgreSQL store
pub struct DatabaseManager;

impl DatabaseManager {
    /// Open a pool against the configured database URL
    pub async fn connect(config: &DatabaseConfig) -> StoreResult<PgPool> {
        let url = config
            .url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or(StoreError::ConfigMissing("DATABASE_URL"))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!(
            "Created database pool (max_connections={})",
            config.max_connections
        );

        if config.run_migrations {
            Self::migrate(&pool).await?;
        }

        Ok(pool)
    }

    /// Apply the embedded migrations
    pub async fn migrate(pool: &PgPool) -> StoreResult<()> {
        sqlx::migrate!("./migrations").run(pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }
}
