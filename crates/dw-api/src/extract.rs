//! Request extractors: JSON and query input with API error rejections, and
//! the authenticated caller.

use std::sync::Arc;

use axum::Json;
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use dw_auth::{Principal, Role, UserId};
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::state::AppState;

/// JSON body whose rejection is an [`ApiError`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// Query string whose rejection is an [`ApiError`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

/// Any authenticated caller: a session user or a connected wallet.
#[derive(Debug, Clone)]
pub struct Caller(pub Principal);

impl FromRequestParts<Arc<AppState>> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        state.authenticate(&parts.headers).await.map(Self)
    }
}

/// A caller signed in with a session token.
#[derive(Debug, Clone)]
pub struct SessionUser {
    /// User id.
    pub id: UserId,
    /// User email.
    pub email: String,
    /// Current role.
    pub role: Role,
}

impl FromRequestParts<Arc<AppState>> for SessionUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        match state.authenticate(&parts.headers).await? {
            Principal::User { id, email, role } => Ok(Self { id, email, role }),
            Principal::Wallet { .. } => Err(ApiError::Unauthorized(
                "a session token is required".to_string(),
            )),
        }
    }
}

/// A caller holding the admin role.
#[derive(Debug, Clone)]
pub struct AdminUser {
    /// Admin user id.
    pub id: UserId,
}

impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let principal = state.authenticate(&parts.headers).await?;
        let id = principal
            .require_admin()
            .map_err(|e| ApiError::Forbidden(e.to_string()))?;
        Ok(Self { id: id.clone() })
    }
}
