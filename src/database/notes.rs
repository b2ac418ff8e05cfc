use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::models::{NewNote, Note, NoteFilter, NotePatch};
use super::{NoteRepository, StoreResult};

const COLUMNS: &str = "id, title, content, folder_id, tags, user_id, created_at, updated_at";

pub struct PgNoteRepository {
    pool: PgPool,
}

impl PgNoteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NoteRepository for PgNoteRepository {
    async fn list(&self, user_id: Uuid, filter: &NoteFilter) -> StoreResult<Vec<Note>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM notes
             WHERE user_id = $1
             AND ($2::text IS NULL OR strpos(lower(title), lower($2)) > 0)
             AND ($3::uuid IS NULL OR folder_id = $3)
             AND ($4::uuid IS NULL OR $4 = ANY(tags))
             ORDER BY updated_at DESC"
        );
        let notes = sqlx::query_as::<_, Note>(&sql)
            .bind(user_id)
            .bind(filter.search_term.as_deref())
            .bind(filter.folder_id)
            .bind(filter.tag_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(notes)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Note>> {
        let sql = format!("SELECT {COLUMNS} FROM notes WHERE id = $1");
        let note = sqlx::query_as::<_, Note>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(note)
    }

    async fn create(&self, user_id: Uuid, note: NewNote) -> StoreResult<Note> {
        let sql = format!(
            "INSERT INTO notes (title, content, folder_id, tags, user_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        let note = sqlx::query_as::<_, Note>(&sql)
            .bind(&note.title)
            .bind(&note.content)
            .bind(note.folder_id)
            .bind(&note.tags)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(note)
    }

    async fn update(&self, user_id: Uuid, id: Uuid, patch: NotePatch) -> StoreResult<Option<Note>> {
        let sql = format!(
            "UPDATE notes SET
                title = COALESCE($3::text, title),
                content = COALESCE($4::text, content),
                folder_id = CASE WHEN $5 THEN $6::uuid ELSE folder_id END,
                tags = COALESCE($7::uuid[], tags),
                updated_at = GREATEST(clock_timestamp(), updated_at + interval '1 microsecond')
             WHERE id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        let note = sqlx::query_as::<_, Note>(&sql)
            .bind(id)
            .bind(user_id)
            .bind(patch.title)
            .bind(patch.content)
            .bind(patch.folder_id.is_some())
            .bind(patch.folder_id.flatten())
            .bind(patch.tags)
            .fetch_optional(&self.pool)
            .await?;
        Ok(note)
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> StoreResult<bool> {
        let deleted = sqlx::query("DELETE FROM notes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(deleted > 0)
    }
}
