//! Fiat/crypto ramp handlers.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::Utc;
use dw_core::{
    OffRampOrder, OffRampRequest, OnRampOrder, OnRampRequest, Quote, QuoteRequest, RampOrder,
};

use crate::error::ApiResult;
use crate::extract::{ApiJson, Caller};
use crate::state::AppState;

/// Handle POST /ramp/onramp - buy crypto with fiat.
pub async fn create_on_ramp(
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
    ApiJson(request): ApiJson<OnRampRequest>,
) -> ApiResult<(StatusCode, Json<OnRampOrder>)> {
    let order = state
        .ramp()
        .write()
        .await
        .create_on_ramp(&principal.owner_id(), request, Utc::now())?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// Handle POST /ramp/offramp - sell crypto for fiat.
pub async fn create_off_ramp(
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
    ApiJson(request): ApiJson<OffRampRequest>,
) -> ApiResult<(StatusCode, Json<OffRampOrder>)> {
    let order = state
        .ramp()
        .write()
        .await
        .create_off_ramp(&principal.owner_id(), request, Utc::now())?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// Handle POST /ramp/quote - price a conversion without placing an order.
pub async fn quote(
    State(state): State<Arc<AppState>>,
    Caller(_principal): Caller,
    ApiJson(request): ApiJson<QuoteRequest>,
) -> ApiResult<Json<Quote>> {
    let quote = state.ramp().read().await.quote(&request, Utc::now())?;
    Ok(Json(quote))
}

/// Handle GET /ramp/orders - the caller's orders, newest first.
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
) -> Json<Vec<RampOrder>> {
    Json(state.ramp().read().await.orders(&principal.owner_id()))
}
