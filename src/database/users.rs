use async_trait::async_trait;
use sqlx::PgPool;

use super::models::{NewUser, User};
use super::{StoreError, StoreResult, UserRepository};

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, fullname, password, created_at, updated_at
             FROM users
             WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn create(&self, user: NewUser) -> StoreResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (username, fullname, password)
             VALUES ($1, $2, $3)
             RETURNING id, username, fullname, password, created_at, updated_at",
        )
        .bind(&user.username)
        .bind(&user.fullname)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::unique(e, "User", "username"))
    }
}
