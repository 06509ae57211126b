//! Login and profile handlers.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use dw_auth::{LoginRequest, Role, User};
use serde::Serialize;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, SessionUser};
use crate::state::AppState;

/// Public view of a signed-in user.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    /// User id.
    pub id: String,
    /// Email.
    pub email: String,
    /// Display name.
    pub full_name: String,
    /// Role.
    pub role: Role,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            role: user.role,
        }
    }
}

/// Successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Bearer token for subsequent requests.
    pub access_token: String,
    /// The signed-in user.
    pub user: UserSummary,
}

/// Profile of the session user.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    /// User id.
    pub user_id: String,
    /// Email.
    pub email: String,
    /// Display name.
    pub full_name: String,
    /// Role.
    pub role: Role,
}

/// Handle POST /auth/login - exchange email and password for a token.
pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    request.validate()?;

    let user = state
        .users()
        .read()
        .await
        .authenticate(&request.email, &request.password)?;
    let access_token = state.jwt().create_token(&user)?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(LoginResponse {
        access_token,
        user: UserSummary::from(&user),
    }))
}

/// Handle GET /auth/profile - the session user's profile.
pub async fn profile(
    State(state): State<Arc<AppState>>,
    session: SessionUser,
) -> ApiResult<Json<ProfileResponse>> {
    let users = state.users().read().await;
    let user = users
        .get(&session.id)
        .ok_or_else(|| ApiError::Unauthorized("account no longer exists".to_string()))?;

    Ok(Json(ProfileResponse {
        user_id: user.id.to_string(),
        email: session.email,
        full_name: user.full_name.clone(),
        role: session.role,
    }))
}
