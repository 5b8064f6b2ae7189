use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use tracing::info;

use crate::api::models::{ClaimedWallet, ConfirmedListQuery, PaymentView, WalletListQuery};
use crate::error::{AppError, AppResult};
use crate::tokenscan::client::LedgerSource;
use crate::tokenscan::db::PaymentsDb;
use crate::tokenscan::models::CachedPayment;

const DEFAULT_WALLET_LIMIT: i64 = 100;
const MAX_WALLET_LIMIT: i64 = 1000;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn PaymentsDb>,
    pub client: Arc<dyn LedgerSource>,
}

pub async fn health_check() -> &'static str {
    "OK"
}

fn to_views(payments: Vec<CachedPayment>) -> AppResult<Vec<PaymentView>> {
    payments.into_iter().map(PaymentView::try_from).collect()
}

/// GET /api/v1/payments
pub async fn list_payments(State(state): State<AppState>) -> AppResult<Json<Vec<PaymentView>>> {
    let payments = state.db.list().await?;
    Ok(Json(to_views(payments)?))
}

/// GET /api/v1/payments/wallet/:address
pub async fn list_wallet_payments(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Query(query): Query<WalletListQuery>,
) -> AppResult<Json<Vec<PaymentView>>> {
    let limit = query.limit.unwrap_or(DEFAULT_WALLET_LIMIT);
    let offset = query.offset.unwrap_or(0);
    if !(1..=MAX_WALLET_LIMIT).contains(&limit) || offset < 0 {
        return Err(AppError::InvalidInput(format!(
            "limit must be 1..={} and offset non-negative",
            MAX_WALLET_LIMIT
        )));
    }

    let payments = state.db.list_wallet(&address, limit, offset).await?;
    Ok(Json(to_views(payments)?))
}

/// GET /api/v1/payments/confirmed
pub async fn list_confirmed_payments(
    State(state): State<AppState>,
    Query(query): Query<ConfirmedListQuery>,
) -> AppResult<Json<Vec<PaymentView>>> {
    let payments = state
        .db
        .list_confirmed(query.block_number.unwrap_or(-1), query.log_index.unwrap_or(0))
        .await?;
    Ok(Json(to_views(payments)?))
}

/// POST /api/v1/wallets/claim
pub async fn claim_wallet(State(state): State<AppState>) -> AppResult<Json<ClaimedWallet>> {
    let address = state.client.claim_wallet().await?;
    info!(address = %address, "claimed new deposit address");
    Ok(Json(ClaimedWallet { address }))
}
