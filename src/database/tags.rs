use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::models::Tag;
use super::{StoreError, StoreResult, TagRepository};

const COLUMNS: &str = "id, name, user_id, created_at, updated_at";

pub struct PgTagRepository {
    pool: PgPool,
}

impl PgTagRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TagRepository for PgTagRepository {
    async fn list(&self, user_id: Uuid, search_term: Option<&str>) -> StoreResult<Vec<Tag>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM tags
             WHERE user_id = $1
             AND ($2::text IS NULL OR strpos(lower(name), lower($2)) > 0)
             ORDER BY updated_at DESC"
        );
        let tags = sqlx::query_as::<_, Tag>(&sql)
            .bind(user_id)
            .bind(search_term)
            .fetch_all(&self.pool)
            .await?;
        Ok(tags)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Tag>> {
        let sql = format!("SELECT {COLUMNS} FROM tags WHERE id = $1");
        let tag = sqlx::query_as::<_, Tag>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tag)
    }

    async fn owned_ids(&self, user_id: Uuid, ids: &[Uuid]) -> StoreResult<Vec<Uuid>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let owned = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM tags WHERE user_id = $1 AND id = ANY($2)",
        )
        .bind(user_id)
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(owned)
    }

    async fn create(&self, user_id: Uuid, name: &str) -> StoreResult<Tag> {
        let sql = format!("INSERT INTO tags (name, user_id) VALUES ($1, $2) RETURNING {COLUMNS}");
        sqlx::query_as::<_, Tag>(&sql)
            .bind(name)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::unique(e, "Tag", "name"))
    }

    async fn update(&self, user_id: Uuid, id: Uuid, name: &str) -> StoreResult<Option<Tag>> {
        let sql = format!(
            "UPDATE tags
             SET name = $3, updated_at = GREATEST(clock_timestamp(), updated_at + interval '1 microsecond')
             WHERE id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Tag>(&sql)
            .bind(id)
            .bind(user_id)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::unique(e, "Tag", "name"))
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM tags WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted > 0 {
            sqlx::query(
                "UPDATE notes
                 SET tags = array_remove(tags, $1), updated_at = GREATEST(clock_timestamp(), updated_at + interval '1 microsecond')
                 WHERE user_id = $2 AND $1 = ANY(tags)",
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
