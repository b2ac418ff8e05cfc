use axum::{
    extract::{OriginalUri, Path, State},
    Extension,
};
use serde_json::Value;

use super::{location, name_from, SearchQuery};
use crate::auth::UserIdentity;
use crate::database::models::Tag;
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiQuery, ApiResponse, ApiResult};
use crate::state::AppState;
use crate::validation::{require_ownership, require_valid_id};

/// GET /api/tags?searchTerm= - The caller's tags, most recently updated first
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> ApiResult<Vec<Tag>> {
    let tags = state.store.tags.list(user.id, query.term()).await?;
    Ok(ApiResponse::success(tags))
}

/// GET /api/tags/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(id): Path<String>,
) -> ApiResult<Tag> {
    let id = require_valid_id::<Tag>(&id)?;
    let tag = require_ownership(state.store.tags.find_by_id(id).await?, user.id)?;
    Ok(ApiResponse::success(tag))
}

/// POST /api/tags
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    OriginalUri(uri): OriginalUri,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Tag> {
    let name = name_from(&body)?;
    let tag = state.store.tags.create(user.id, &name).await?;
    tracing::info!("Created tag {} for {}", tag.id, user.username);

    let location = location(&uri, tag.id);
    Ok(ApiResponse::created(tag, location))
}

/// PUT /api/tags/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Tag> {
    let id = require_valid_id::<Tag>(&id)?;
    let name = name_from(&body)?;
    require_ownership(state.store.tags.find_by_id(id).await?, user.id)?;

    let tag = state
        .store
        .tags
        .update(user.id, id, &name)
        .await?
        .ok_or_else(|| ApiError::not_found("Tag not found"))?;
    tracing::info!("Updated tag {}", tag.id);

    Ok(ApiResponse::success(tag))
}

/// DELETE /api/tags/:id - The tag is also removed from every note that carries it
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id = require_valid_id::<Tag>(&id)?;
    if state.store.tags.delete(user.id, id).await? {
        tracing::info!("Deleted tag {}", id);
    }
    Ok(ApiResponse::no_content())
}
