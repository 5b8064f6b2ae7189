//! Reconciliation of provider-reported token payments into a local,
//! confirmation-aware cache.

pub mod chore;
pub mod client;
pub mod db;
pub mod models;
pub mod postgres;

pub use chore::{Chore, ChoreHandle, TickOutcome};
pub use client::{LedgerSource, TokenscanClient};
pub use db::PaymentsDb;
pub use models::{CachedPayment, Header, LatestPayments, Payment, PaymentStatus};
pub use postgres::PostgresPaymentsDb;
