//! Wallet and transaction handlers.
//!
//! Every route here is scoped to the caller: wallets are stored under the
//! caller's owner id, and other owners' wallets answer 404.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use dw_core::{NewTransaction, NewWallet, Wallet, WalletSummary, WalletTransaction};

use crate::error::ApiResult;
use crate::extract::{ApiJson, Caller};
use crate::state::AppState;

/// Handle POST /wallet - create a wallet.
pub async fn create_wallet(
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
    ApiJson(request): ApiJson<NewWallet>,
) -> ApiResult<(StatusCode, Json<Wallet>)> {
    let wallet = state.wallets().write().await.create_wallet(
        &principal.owner_id(),
        principal.wallet_address(),
        request,
    )?;
    Ok((StatusCode::CREATED, Json(wallet)))
}

/// Handle GET /wallet - the caller's wallets.
pub async fn list_wallets(
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
) -> Json<Vec<Wallet>> {
    Json(state.wallets().read().await.list_wallets(&principal.owner_id()))
}

/// Handle GET /wallet/summary - dashboard totals and recent activity.
pub async fn wallet_summary(
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
) -> Json<WalletSummary> {
    Json(state.wallets().read().await.summary(&principal.owner_id()))
}

/// Handle GET /wallet/{address} - one wallet.
pub async fn get_wallet(
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
    Path(address): Path<String>,
) -> ApiResult<Json<Wallet>> {
    let wallet = state
        .wallets()
        .read()
        .await
        .get_wallet(&principal.owner_id(), &address)?;
    Ok(Json(wallet))
}

/// Handle POST /wallet/{address}/transaction - record a pending transaction.
pub async fn create_transaction(
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
    Path(address): Path<String>,
    ApiJson(request): ApiJson<NewTransaction>,
) -> ApiResult<(StatusCode, Json<WalletTransaction>)> {
    let tx = state
        .wallets()
        .write()
        .await
        .create_transaction(&principal.owner_id(), &address, request)?;
    Ok((StatusCode::CREATED, Json(tx)))
}

/// Handle GET /wallet/{address}/transactions - history, newest first.
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
    Path(address): Path<String>,
) -> ApiResult<Json<Vec<WalletTransaction>>> {
    let history = state
        .wallets()
        .read()
        .await
        .list_transactions(&principal.owner_id(), &address)?;
    Ok(Json(history))
}
