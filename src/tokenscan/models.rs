use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::monetary::Amount;

/// Chain block header as reported by the provider. Ephemeral: only used to
/// establish the confirmation baseline within a single fetch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    pub hash: String,
    pub number: i64,
    pub timestamp: DateTime<Utc>,
}

/// One observed transfer in wire form. `token_value` is an integer count of
/// the token's smallest unit; `usd_value` arrives as a provider-computed
/// decimal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub from: String,
    pub to: String,
    pub token_value: i128,
    pub usd_value: Decimal,
    pub block_hash: String,
    pub block_number: i64,
    pub transaction: String,
    pub log_index: i32,
    pub timestamp: DateTime<Utc>,
}

/// Fetch result: all payments from the requested block onward plus the
/// provider's current chain head.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestPayments {
    pub latest_block: Header,
    pub payments: Vec<Payment>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Confirmed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Confirmed => "confirmed",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(PaymentStatus::Pending),
            "confirmed" => Some(PaymentStatus::Confirmed),
            _ => None,
        }
    }
}

/// Durable projection of a payment: the wire fields plus the derived status.
/// Identity is `(transaction, log_index)`; a given ledger location appears
/// at most once in the cache.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedPayment {
    pub from: String,
    pub to: String,
    pub token_value: Amount,
    pub usd_value: Amount,
    pub status: PaymentStatus,
    pub block_hash: String,
    pub block_number: i64,
    pub transaction: String,
    pub log_index: i32,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_payments_deserializes_wire_format() {
        let body = r#"{
            "latestBlock": {
                "hash": "0xabc",
                "number": 100,
                "timestamp": "2024-01-01T00:00:00Z"
            },
            "payments": [{
                "from": "0xsender",
                "to": "0xreceiver",
                "tokenValue": 150000000,
                "usdValue": 1.25,
                "blockHash": "0xblock",
                "blockNumber": 99,
                "transaction": "0xtx",
                "logIndex": 3,
                "timestamp": "2024-01-01T00:00:10Z"
            }]
        }"#;

        let parsed: LatestPayments = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.latest_block.number, 100);
        assert_eq!(parsed.payments.len(), 1);

        let payment = &parsed.payments[0];
        assert_eq!(payment.token_value, 150_000_000);
        assert_eq!(payment.usd_value.to_string(), "1.25");
        assert_eq!(payment.block_number, 99);
        assert_eq!(payment.log_index, 3);
    }

    #[test]
    fn payment_status_round_trips_as_str() {
        for status in [PaymentStatus::Pending, PaymentStatus::Confirmed] {
            assert_eq!(PaymentStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(PaymentStatus::from_str("settled"), None);
    }
}
