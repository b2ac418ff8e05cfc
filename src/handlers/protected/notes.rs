use axum::{
    extract::{OriginalUri, Path, State},
    Extension,
};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use super::location;
use crate::auth::UserIdentity;
use crate::database::models::{Folder, NewNote, Note, NoteFilter, NotePatch, Resource, Tag};
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiQuery, ApiResponse, ApiResult};
use crate::state::AppState;
use crate::validation::{
    folder_reference, optional_string, require_fields, require_object, require_ownership,
    require_valid_id, tag_references,
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotesQuery {
    pub search_term: Option<String>,
    pub folder_id: Option<String>,
    pub tag_id: Option<String>,
}

impl NotesQuery {
    fn into_filter(self) -> Result<NoteFilter, ApiError> {
        fn id<R: Resource>(raw: Option<String>) -> Result<Option<Uuid>, ApiError> {
            match raw.filter(|raw| !raw.is_empty()) {
                Some(raw) => require_valid_id::<R>(&raw).map(Some),
                None => Ok(None),
            }
        }

        Ok(NoteFilter {
            search_term: self.search_term.filter(|term| !term.is_empty()),
            folder_id: id::<Folder>(self.folder_id)?,
            tag_id: id::<Tag>(self.tag_id)?,
        })
    }
}

/// GET /api/notes?searchTerm=&folderId=&tagId=
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    ApiQuery(query): ApiQuery<NotesQuery>,
) -> ApiResult<Vec<Note>> {
    let filter = query.into_filter()?;
    let notes = state.store.notes.list(user.id, &filter).await?;
    Ok(ApiResponse::success(notes))
}

/// GET /api/notes/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(id): Path<String>,
) -> ApiResult<Note> {
    let id = require_valid_id::<Note>(&id)?;
    let note = require_ownership(state.store.notes.find_by_id(id).await?, user.id)?;
    Ok(ApiResponse::success(note))
}

/// POST /api/notes
///
/// Expected Input:
/// ```json
/// { "title": "Cats", "content": "...", "folderId": "<uuid>", "tags": ["<uuid>"] }
/// ```
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    OriginalUri(uri): OriginalUri,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Note> {
    require_fields(&body, &["title", "content"])?;
    let fields = require_object(&body)?;

    let title = optional_string(fields, "title")?.unwrap_or_default();
    let content = optional_string(fields, "content")?.unwrap_or_default();
    let folder_id = folder_reference(&state.store, user.id, fields).await?.flatten();
    let tags = tag_references(&state.store, user.id, fields)
        .await?
        .unwrap_or_default();

    let note = state
        .store
        .notes
        .create(
            user.id,
            NewNote {
                title,
                content,
                folder_id,
                tags,
            },
        )
        .await?;
    tracing::info!("Created note {} for {}", note.id, user.username);

    let location = location(&uri, note.id);
    Ok(ApiResponse::created(note, location))
}

/// PUT /api/notes/:id - Replaces only the fields present in the body
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Note> {
    let id = require_valid_id::<Note>(&id)?;
    let fields = require_object(&body)?;
    if fields.contains_key("title") {
        require_fields(&body, &["title"])?;
    }

    let title = optional_string(fields, "title")?;
    let content = optional_string(fields, "content")?;
    require_ownership(state.store.notes.find_by_id(id).await?, user.id)?;

    let patch = NotePatch {
        title,
        content,
        folder_id: folder_reference(&state.store, user.id, fields).await?,
        tags: tag_references(&state.store, user.id, fields).await?,
    };

    let note = state
        .store
        .notes
        .update(user.id, id, patch)
        .await?
        .ok_or_else(|| ApiError::not_found("Note not found"))?;
    tracing::info!("Updated note {}", note.id);

    Ok(ApiResponse::success(note))
}

/// DELETE /api/notes/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id = require_valid_id::<Note>(&id)?;
    if state.store.notes.delete(user.id, id).await? {
        tracing::info!("Deleted note {}", id);
    }
    Ok(ApiResponse::no_content())
}
