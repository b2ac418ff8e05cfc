// Handlers behind `jwt_auth_middleware`; every one receives the caller's
// `UserIdentity` through request extensions and scopes store calls by its id.
pub mod auth;
pub mod folders;
pub mod notes;
pub mod tags;

use axum::http::Uri;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::error::ApiError;
use crate::validation::{optional_string, require_fields, require_object};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub search_term: Option<String>,
}

impl SearchQuery {
    /// An empty `searchTerm` means no filter
    pub fn term(&self) -> Option<&str> {
        self.search_term.as_deref().filter(|term| !term.is_empty())
    }
}

/// `Location` for a resource created at the collection `uri`
pub(crate) fn location(uri: &Uri, id: Uuid) -> String {
    format!("{}/{}", uri.path().trim_end_matches('/'), id)
}

/// Required `name` of a folder or tag
pub(crate) fn name_from(body: &Value) -> Result<String, ApiError> {
    require_fields(body, &["name"])?;
    Ok(optional_string(require_object(body)?, "name")?.unwrap_or_default())
}
