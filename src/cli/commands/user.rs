use anyhow::{bail, Context};

use crate::auth::hash_password;
use crate::cli::OutputFormat;
use crate::config::{AppConfig, StoreBackend};
use crate::database::models::NewUser;
use crate::server::open_store;

/// Hash the password and insert the user into the configured store
pub async fn create(
    config: &AppConfig,
    username: String,
    password: String,
    fullname: String,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    if config.database.backend == StoreBackend::Memory {
        bail!("create-user needs a persistent store; set STORE_BACKEND=postgres, or seed the memory store with SEED_USERNAME/SEED_PASSWORD");
    }
    if username.trim().is_empty() || password.is_empty() {
        bail!("username and password must not be empty");
    }

    let store = open_store(config).await?;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .context("password hashing task failed")??;

    let user = store
        .users
        .create(NewUser {
            username,
            fullname,
            password_hash,
        })
        .await
        .context("failed to create user")?;

    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&user)?),
        OutputFormat::Text => println!("Created user {} ({})", user.username, user.id),
    }
    Ok(())
}
