use axum::{
    extract::{OriginalUri, Path, State},
    Extension,
};
use serde_json::Value;

use super::{location, name_from, SearchQuery};
use crate::auth::UserIdentity;
use crate::database::models::Folder;
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiQuery, ApiResponse, ApiResult};
use crate::state::AppState;
use crate::validation::{require_ownership, require_valid_id};

/// GET /api/folders?searchTerm= - The caller's folders, most recently updated first
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> ApiResult<Vec<Folder>> {
    let folders = state.store.folders.list(user.id, query.term()).await?;
    Ok(ApiResponse::success(folders))
}

/// GET /api/folders/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(id): Path<String>,
) -> ApiResult<Folder> {
    let id = require_valid_id::<Folder>(&id)?;
    let folder = require_ownership(state.store.folders.find_by_id(id).await?, user.id)?;
    Ok(ApiResponse::success(folder))
}

/// POST /api/folders
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    OriginalUri(uri): OriginalUri,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Folder> {
    let name = name_from(&body)?;
    let folder = state.store.folders.create(user.id, &name).await?;
    tracing::info!("Created folder {} for {}", folder.id, user.username);

    let location = location(&uri, folder.id);
    Ok(ApiResponse::created(folder, location))
}

/// PUT /api/folders/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Folder> {
    let id = require_valid_id::<Folder>(&id)?;
    let name = name_from(&body)?;
    require_ownership(state.store.folders.find_by_id(id).await?, user.id)?;

    let folder = state
        .store
        .folders
        .update(user.id, id, &name)
        .await?
        .ok_or_else(|| ApiError::not_found("Folder not found"))?;
    tracing::info!("Updated folder {}", folder.id);

    Ok(ApiResponse::success(folder))
}

/// DELETE /api/folders/:id - Notes in the folder are kept and lose their `folderId`
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id = require_valid_id::<Folder>(&id)?;
    if state.store.folders.delete(user.id, id).await? {
        tracing::info!("Deleted folder {}", id);
    }
    Ok(ApiResponse::no_content())
}
