//! Request validation shared by the route handlers.

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::database::models::Resource;
use crate::database::Store;
use crate::error::ApiError;

/// The body as a JSON object, or a 400.
pub fn require_object(body: &Value) -> Result<&Map<String, Value>, ApiError> {
    body.as_object()
        .ok_or_else(|| ApiError::validation_error("Request body must be a JSON object"))
}

/// Fails on the first field that is absent, `null`, or an empty string.
pub fn require_fields(body: &Value, fields: &[&str]) -> Result<(), ApiError> {
    let object = require_object(body)?;
    for field in fields {
        let present = match object.get(*field) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.is_empty(),
            Some(_) => true,
        };
        if !present {
            let message = format!("Missing `{}` in request body", field);
            tracing::debug!("{}", message);
            return Err(ApiError::validation_error(message));
        }
    }
    Ok(())
}

/// Parse a path id, naming the resource in the error.
pub fn require_valid_id<R: Resource>(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id)
        .map_err(|_| ApiError::validation_error(format!("{} Id: {} is not valid", R::NAME, id)))
}

/// Missing and foreign resources both read as 404.
pub fn require_ownership<R: Resource>(resource: Option<R>, user_id: Uuid) -> Result<R, ApiError> {
    match resource {
        Some(resource) if resource.user_id() == user_id => Ok(resource),
        _ => Err(ApiError::not_found(format!("{} not found", R::NAME))),
    }
}

/// Optional string field; a non-string value is a 400.
pub fn optional_string(body: &Map<String, Value>, field: &str) -> Result<Option<String>, ApiError> {
    match body.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ApiError::validation_error(format!(
            "The `{}` property must be a string",
            field
        ))),
    }
}

fn invalid_folder_reference() -> ApiError {
    ApiError::validation_error("The `folderId` is not valid")
}

fn invalid_tag_reference() -> ApiError {
    ApiError::validation_error("The `tags` array contains an invalid `id`")
}

/// Resolve a note's `folderId`.
///
/// `None` when the field is absent, `Some(None)` when it is `null` or `""`
/// (clear the folder), `Some(Some(id))` for a folder the caller owns.
pub async fn folder_reference(
    store: &Store,
    user_id: Uuid,
    body: &Map<String, Value>,
) -> Result<Option<Option<Uuid>>, ApiError> {
    let raw = match body.get("folderId") {
        None => return Ok(None),
        Some(Value::Null) => return Ok(Some(None)),
        Some(Value::String(s)) if s.is_empty() => return Ok(Some(None)),
        Some(Value::String(s)) => s,
        Some(_) => return Err(invalid_folder_reference()),
    };

    let folder_id = Uuid::parse_str(raw).map_err(|_| invalid_folder_reference())?;
    let folder = store.folders.find_by_id(folder_id).await?;
    require_ownership(folder, user_id).map_err(|_| invalid_folder_reference())?;

    Ok(Some(Some(folder_id)))
}

/// Resolve a note's `tags`: absent is `None`, `null` is an empty list,
/// otherwise every entry must be a tag the caller owns. Duplicates collapse.
pub async fn tag_references(
    store: &Store,
    user_id: Uuid,
    body: &Map<String, Value>,
) -> Result<Option<Vec<Uuid>>, ApiError> {
    let items = match body.get("tags") {
        None => return Ok(None),
        Some(Value::Null) => return Ok(Some(vec![])),
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(ApiError::validation_error(
                "The `tags` property must be an array",
            ))
        }
    };

    let mut ids: Vec<Uuid> = Vec::with_capacity(items.len());
    for item in items {
        let id = item
            .as_str()
            .and_then(|s| Uuid::parse_str(s).ok())
            .ok_or_else(invalid_tag_reference)?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }

    if !ids.is_empty() {
        let owned = store.tags.owned_ids(user_id, &ids).await?;
        if owned.len() != ids.len() {
            return Err(invalid_tag_reference());
        }
    }

    Ok(Some(ids))
}
