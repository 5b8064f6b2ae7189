use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::types::BigDecimal;
use sqlx::{PgPool, Row};

use crate::error::DbError;
use crate::monetary::{Amount, TOKEN, USD_MICRO};
use crate::tokenscan::db::PaymentsDb;
use crate::tokenscan::models::{CachedPayment, PaymentStatus};

/// Postgres-backed payments cache. Amounts are stored as NUMERIC counts of
/// base units; identity is the `(tx_hash, log_index)` primary key.
pub struct PostgresPaymentsDb {
    pool: PgPool,
}

impl PostgresPaymentsDb {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_COLUMNS: &str = "from_address, to_address, token_value, usd_value, status, \
     block_hash, block_number, tx_hash, log_index, block_timestamp";

fn base_units_to_bigdecimal(units: i128) -> BigDecimal {
    // i128 decimal text always parses as a NUMERIC-compatible value.
    BigDecimal::from_str(&units.to_string()).expect("i128 formats as a valid decimal")
}

fn decode_base_units(value: &BigDecimal, column: &str) -> Result<i128, DbError> {
    i128::from_str(&value.to_string())
        .map_err(|err| DbError::Corrupt(format!("{}: {}", column, err)))
}

fn row_to_payment(row: &PgRow) -> Result<CachedPayment, DbError> {
    let token_value: BigDecimal = row.try_get("token_value")?;
    let usd_value: BigDecimal = row.try_get("usd_value")?;
    let status: String = row.try_get("status")?;
    let status = PaymentStatus::from_str(&status)
        .ok_or_else(|| DbError::Corrupt(format!("unknown payment status {:?}", status)))?;

    Ok(CachedPayment {
        from: row.try_get("from_address")?,
        to: row.try_get("to_address")?,
        token_value: Amount::from_base_units(decode_base_units(&token_value, "token_value")?, TOKEN),
        usd_value: Amount::from_base_units(decode_base_units(&usd_value, "usd_value")?, USD_MICRO),
        status,
        block_hash: row.try_get("block_hash")?,
        block_number: row.try_get("block_number")?,
        transaction: row.try_get("tx_hash")?,
        log_index: row.try_get("log_index")?,
        timestamp: row.try_get::<DateTime<Utc>, _>("block_timestamp")?,
    })
}

#[async_trait]
impl PaymentsDb for PostgresPaymentsDb {
    async fn insert_batch(&self, payments: Vec<CachedPayment>) -> Result<(), DbError> {
        if payments.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;

        for payment in &payments {
            sqlx::query(
                r#"
                INSERT INTO token_payments (
                    from_address, to_address, token_value, usd_value, status,
                    block_hash, block_number, tx_hash, log_index, block_timestamp
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                ON CONFLICT (tx_hash, log_index)
                DO UPDATE SET
                    from_address = EXCLUDED.from_address,
                    to_address = EXCLUDED.to_address,
                    token_value = EXCLUDED.token_value,
                    usd_value = EXCLUDED.usd_value,
                    status = EXCLUDED.status,
                    block_hash = EXCLUDED.block_hash,
                    block_number = EXCLUDED.block_number,
                    block_timestamp = EXCLUDED.block_timestamp
                "#,
            )
            .bind(&payment.from)
            .bind(&payment.to)
            .bind(base_units_to_bigdecimal(payment.token_value.base_units()))
            .bind(base_units_to_bigdecimal(payment.usd_value.base_units()))
            .bind(payment.status.as_str())
            .bind(&payment.block_hash)
            .bind(payment.block_number)
            .bind(&payment.transaction)
            .bind(payment.log_index)
            .bind(payment.timestamp)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete_pending(&self) -> Result<(), DbError> {
        sqlx::query("DELETE FROM token_payments WHERE status = $1")
            .bind(PaymentStatus::Pending.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn last_block(&self, status: PaymentStatus) -> Result<i64, DbError> {
        let row = sqlx::query(
            r#"
            SELECT block_number FROM token_payments
            WHERE status = $1
            ORDER BY block_number DESC
            LIMIT 1
            "#,
        )
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(row.try_get("block_number")?),
            None => Err(DbError::NoPayments),
        }
    }

    async fn list(&self) -> Result<Vec<CachedPayment>, DbError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {SELECT_COLUMNS} FROM token_payments
            ORDER BY block_number DESC, log_index DESC
            "#
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_payment).collect()
    }

    async fn list_wallet(
        &self,
        wallet: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CachedPayment>, DbError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {SELECT_COLUMNS} FROM token_payments
            WHERE to_address = $1
            ORDER BY block_number DESC, log_index DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(wallet)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_payment).collect()
    }

    async fn list_confirmed(
        &self,
        block_number: i64,
        log_index: i32,
    ) -> Result<Vec<CachedPayment>, DbError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {SELECT_COLUMNS} FROM token_payments
            WHERE status = $1 AND (block_number, log_index) > ($2, $3)
            ORDER BY block_number ASC, log_index ASC
            "#
        ))
        .bind(PaymentStatus::Confirmed.as_str())
        .bind(block_number)
        .bind(log_index)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_payment).collect()
    }
}
