use axum::extract::State;
use serde::Serialize;
use serde_json::Value;

use crate::auth::{verify_password, verify_without_user, AuthError, UserIdentity};
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::state::AppState;
use crate::validation::{optional_string, require_fields, require_object};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub auth_token: String,
    pub user: UserIdentity,
}

/// POST /api/auth - Exchange username/password for a bearer token
///
/// Expected Input:
/// ```json
/// { "username": "bobuser", "password": "baseball" }
/// ```
///
/// Unknown users and wrong passwords produce the same 401.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<LoginResponse> {
    require_fields(&body, &["username", "password"])?;
    let credentials = require_object(&body)?;
    let username = optional_string(credentials, "username")?.unwrap_or_default();
    let password = optional_string(credentials, "password")?.unwrap_or_default();

    let user = state.store.users.find_by_username(&username).await?;

    // Unknown users pay the same hashing cost as wrong passwords
    let stored_hash = user.as_ref().map(|user| user.password.clone());
    let valid = tokio::task::spawn_blocking(move || match stored_hash {
        Some(hash) => verify_password(&password, &hash),
        None => verify_without_user(&password),
    })
    .await
    .map_err(|e| {
        tracing::error!("Password verification task failed: {}", e);
        ApiError::internal_server_error("An error occurred while processing your request")
    })??;

    let user = match user {
        Some(user) if valid => user,
        Some(_) => {
            tracing::warn!("Login failed: wrong password for '{}'", username);
            return Err(AuthError::InvalidCredentials.into());
        }
        None => {
            tracing::warn!("Login failed: unknown user '{}'", username);
            return Err(AuthError::InvalidCredentials.into());
        }
    };

    let identity = UserIdentity::from(&user);
    let auth_token = state.tokens.issue(&identity)?;
    tracing::info!("User '{}' logged in", identity.username);

    Ok(ApiResponse::success(LoginResponse {
        auth_token,
        user: identity,
    }))
}
