use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::models::Folder;
use super::{FolderRepository, StoreError, StoreResult};

const COLUMNS: &str = "id, name, user_id, created_at, updated_at";

pub struct PgFolderRepository {
    pool: PgPool,
}

impl PgFolderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FolderRepository for PgFolderRepository {
    async fn list(&self, user_id: Uuid, search_term: Option<&str>) -> StoreResult<Vec<Folder>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM folders
             WHERE user_id = $1
             AND ($2::text IS NULL OR strpos(lower(name), lower($2)) > 0)
             ORDER BY updated_at DESC"
        );
        let folders = sqlx::query_as::<_, Folder>(&sql)
            .bind(user_id)
            .bind(search_term)
            .fetch_all(&self.pool)
            .await?;
        Ok(folders)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Folder>> {
        let sql = format!("SELECT {COLUMNS} FROM folders WHERE id = $1");
        let folder = sqlx::query_as::<_, Folder>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(folder)
    }

    async fn create(&self, user_id: Uuid, name: &str) -> StoreResult<Folder> {
        let sql = format!("INSERT INTO folders (name, user_id) VALUES ($1, $2) RETURNING {COLUMNS}");
        sqlx::query_as::<_, Folder>(&sql)
            .bind(name)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::unique(e, "Folder", "name"))
    }

    async fn update(&self, user_id: Uuid, id: Uuid, name: &str) -> StoreResult<Option<Folder>> {
        let sql = format!(
            "UPDATE folders
             SET name = $3, updated_at = GREATEST(clock_timestamp(), updated_at + interval '1 microsecond')
             WHERE id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Folder>(&sql)
            .bind(id)
            .bind(user_id)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::unique(e, "Folder", "name"))
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM folders WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted > 0 {
            // Notes survive their folder
            sqlx::query(
                "UPDATE notes
                 SET folder_id = NULL, updated_at = GREATEST(clock_timestamp(), updated_at + interval '1 microsecond')
                 WHERE folder_id = $1 AND user_id = $2",
            )
            .bind(id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(deleted > 0)
    }
}
