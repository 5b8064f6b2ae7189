use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::tokenscan::models::{CachedPayment, PaymentStatus};

/// Payment row as exposed over HTTP. Token value is a base-unit string to
/// avoid JSON number precision issues; the USD value is a decimal string.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentView {
    pub from: String,
    pub to: String,
    pub token_value: String,
    pub usd_value: String,
    pub status: PaymentStatus,
    pub block_hash: String,
    pub block_number: i64,
    pub transaction: String,
    pub log_index: i32,
    pub timestamp: DateTime<Utc>,
}

impl TryFrom<CachedPayment> for PaymentView {
    type Error = AppError;

    fn try_from(payment: CachedPayment) -> Result<Self, AppError> {
        Ok(Self {
            from: payment.from,
            to: payment.to,
            token_value: payment.token_value.base_units().to_string(),
            usd_value: payment.usd_value.as_decimal()?.to_string(),
            status: payment.status,
            block_hash: payment.block_hash,
            block_number: payment.block_number,
            transaction: payment.transaction,
            log_index: payment.log_index,
            timestamp: payment.timestamp,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct WalletListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmedListQuery {
    pub block_number: Option<i64>,
    pub log_index: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct ClaimedWallet {
    pub address: String,
}
