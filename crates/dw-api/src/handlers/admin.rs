//! Administration handlers: user and wallet management.
//!
//! All routes require a session token for an account with the admin role.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use dw_auth::{User, UserFilter, UserId, UserStatus};
use dw_core::{OwnerId, Wallet, WalletFilter, WalletStatus};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::extract::{AdminUser, ApiJson, ApiQuery};
use crate::state::AppState;

/// Admin check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    /// Always true; non-admins are refused before reaching the handler.
    pub is_admin: bool,
    /// Admin user id.
    pub user_id: String,
}

/// Optional body for a user status change.
#[derive(Debug, Deserialize)]
pub struct UserStatusUpdate {
    /// Target status.
    pub status: UserStatus,
}

/// Body for a wallet status change.
#[derive(Debug, Deserialize)]
pub struct WalletStatusUpdate {
    /// Target status.
    pub status: WalletStatus,
}

/// Result of removing a user.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovedUser {
    /// Removed user id.
    pub id: String,
    /// Wallets removed with the user.
    pub wallets_removed: usize,
    /// Ramp orders removed with the user.
    pub orders_removed: usize,
}

/// Handle GET /admin/verify - confirm the caller is an admin.
pub async fn verify(admin: AdminUser) -> Json<VerifyResponse> {
    Json(VerifyResponse {
        is_admin: true,
        user_id: admin.id.to_string(),
    })
}

/// Handle GET /admin/users - list users with optional `search` and `status`.
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    ApiQuery(filter): ApiQuery<UserFilter>,
) -> Json<Vec<User>> {
    Json(state.users().read().await.list(&filter))
}

/// Handle POST /admin/users/{id}/status - set or toggle a user's status.
///
/// An empty body toggles between active and inactive.
pub async fn set_user_status(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<User>> {
    let id = UserId::from_string(id)?;
    if id == admin.id {
        return Err(ApiError::InvalidRequest(
            "admins cannot change their own status".to_string(),
        ));
    }

    let mut users = state.users().write().await;
    let user = if body.is_empty() {
        users.toggle_status(&id)?
    } else {
        let update: UserStatusUpdate = serde_json::from_slice(&body)?;
        users.set_status(&id, update.status)?
    };

    info!(admin = %admin.id, user_id = %user.id, status = %user.status, "admin changed user status");
    Ok(Json(user))
}

/// Handle DELETE /admin/users/{id} - remove a user with their wallets and orders.
pub async fn remove_user(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Path(id): Path<String>,
) -> ApiResult<Json<RemovedUser>> {
    let id = UserId::from_string(id)?;
    if id == admin.id {
        return Err(ApiError::InvalidRequest(
            "admins cannot remove their own account".to_string(),
        ));
    }

    let mut users = state.users().write().await;
    let user = users.remove(&id)?;
    let owner = OwnerId::new(user.id.as_str());
    let wallets_removed = state.wallets().write().await.remove_owner(&owner);
    let orders_removed = state.ramp().write().await.remove_user(&owner);

    info!(admin = %admin.id, user_id = %user.id, wallets_removed, orders_removed, "admin removed user");
    Ok(Json(RemovedUser {
        id: user.id.to_string(),
        wallets_removed,
        orders_removed,
    }))
}

/// Handle GET /admin/wallets - every wallet, filtered and sorted.
pub async fn list_wallets(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    ApiQuery(filter): ApiQuery<WalletFilter>,
) -> Json<Vec<Wallet>> {
    Json(state.wallets().read().await.all_wallets(&filter))
}

/// Handle POST /admin/wallets/{address}/status - activate or deactivate a wallet.
pub async fn set_wallet_status(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Path(address): Path<String>,
    ApiJson(update): ApiJson<WalletStatusUpdate>,
) -> ApiResult<Json<Wallet>> {
    let wallet = state
        .wallets()
        .write()
        .await
        .set_status(&address, update.status)?;
    info!(admin = %admin.id, address = %wallet.address, "admin changed wallet status");
    Ok(Json(wallet))
}

/// Handle DELETE /admin/wallets/{address} - remove a wallet.
pub async fn remove_wallet(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Path(address): Path<String>,
) -> ApiResult<Json<Wallet>> {
    let wallet = state.wallets().write().await.remove(&address)?;
    info!(admin = %admin.id, address = %wallet.address, "admin removed wallet");
    Ok(Json(wallet))
}
