use async_trait::async_trait;

use crate::error::DbError;
use crate::tokenscan::models::{CachedPayment, PaymentStatus};

/// Cache of observed token payments, keyed by `(transaction, log_index)`.
///
/// The reconciliation chore relies on two guarantees from implementations:
/// `insert_batch` is atomic as a unit, and readers observe a
/// `delete_pending` / `insert_batch` pair either as the old pending rows or
/// the new batch, never a mix.
#[async_trait]
pub trait PaymentsDb: Send + Sync {
    /// Inserts a classified batch. All rows become visible together or not
    /// at all; rows sharing an identity pair with an existing row replace it.
    async fn insert_batch(&self, payments: Vec<CachedPayment>) -> Result<(), DbError>;

    /// Removes every pending row. Deleting when none exist is a no-op.
    async fn delete_pending(&self) -> Result<(), DbError>;

    /// Highest block number among rows with the given status. Fails with
    /// `DbError::NoPayments` when no such row exists.
    async fn last_block(&self, status: PaymentStatus) -> Result<i64, DbError>;

    /// All cached payments ordered by (block number, log index) descending.
    async fn list(&self) -> Result<Vec<CachedPayment>, DbError>;

    /// Payments received by `wallet`, ordered by (block number, log index)
    /// descending.
    async fn list_wallet(
        &self,
        wallet: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CachedPayment>, DbError>;

    /// Confirmed payments strictly after the given (block number, log index)
    /// position, ascending.
    async fn list_confirmed(
        &self,
        block_number: i64,
        log_index: i32,
    ) -> Result<Vec<CachedPayment>, DbError>;
}
