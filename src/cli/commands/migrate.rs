use anyhow::Context;

use crate::config::AppConfig;
use crate::database::manager::DatabaseManager;

pub async fn handle(config: &AppConfig) -> anyhow::Result<()> {
    let mut database = config.database.clone();
    database.run_migrations = false;

    let pool = DatabaseManager::connect(&database)
        .await
        .context("failed to connect to the database")?;
    DatabaseManager::migrate(&pool)
        .await
        .context("failed to apply migrations")?;

    println!("Migrations applied");
    Ok(())
}
