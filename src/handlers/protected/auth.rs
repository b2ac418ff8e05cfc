use axum::{extract::State, Extension};
use serde::Serialize;

use crate::auth::UserIdentity;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub auth_token: String,
}

/// POST /api/auth/refresh - Reissue a token for the current identity with a new expiry
pub async fn refresh(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<RefreshResponse> {
    let auth_token = state.tokens.issue(&user)?;
    tracing::debug!("Refreshed token for '{}'", user.username);
    Ok(ApiResponse::success(RefreshResponse { auth_token }))
}
