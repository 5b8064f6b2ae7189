use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, error, info};

use crate::config::TokenscanConfig;
use crate::error::{ChoreError, DbError};
use crate::monetary::{Amount, TOKEN, USD_MICRO};
use crate::tokenscan::client::LedgerSource;
use crate::tokenscan::db::PaymentsDb;
use crate::tokenscan::models::{CachedPayment, PaymentStatus};

/// What a single tick did, for logs and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Loop administratively disabled; nothing fetched, nothing written.
    Disabled,
    /// Provider reported no payments past the cursor; existing pending rows
    /// are left in place.
    NoNewPayments,
    /// Pending set replaced with a freshly classified batch.
    Stored { confirmed: usize, pending: usize },
}

/// Periodically pulls payments from the ledger source and maintains the
/// status-tagged cache. Stateless between ticks: the resume cursor is
/// recomputed from confirmed rows on every pass, so no checkpoint can drift
/// from the cache contents.
pub struct Chore {
    client: Arc<dyn LedgerSource>,
    db: Arc<dyn PaymentsDb>,
    config: TokenscanConfig,
}

/// Handle to a running chore loop. Dropping the handle without calling
/// `stop` leaves the loop running until the task is aborted.
pub struct ChoreHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ChoreHandle {
    /// Signals shutdown and waits for the loop to exit. A signal arriving
    /// mid-tick lets that tick run to completion, so the pending-set
    /// replacement is never abandoned between its delete and insert; a
    /// signal between ticks prevents the next tick from starting.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}

impl Chore {
    pub fn new(
        client: Arc<dyn LedgerSource>,
        db: Arc<dyn PaymentsDb>,
        config: TokenscanConfig,
    ) -> Self {
        Self { client, db, config }
    }

    /// Spawns the reconciliation loop. Ticks never overlap: the next sleep
    /// only starts once the previous tick has finished.
    pub fn start(self: Arc<Self>) -> ChoreHandle {
        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let chore = self;

        let task = tokio::spawn(async move {
            let mut ticker = interval(chore.config.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            info!(
                interval = ?chore.config.interval,
                confirmations = chore.config.confirmations,
                "payment reconciliation loop started"
            );

            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_rx.changed() => break,
                    _ = ticker.tick() => {}
                }

                // Shutdown is only observed at tick boundaries: an in-flight
                // tick always finishes, so the delete/insert replacement is
                // never abandoned between its two calls and every tick
                // failure is surfaced below before the loop can exit.
                match chore.run_once().await {
                    Ok(outcome) => debug!(?outcome, "reconciliation tick finished"),
                    Err(err) => error!(error = %err, "reconciliation tick failed"),
                }
            }

            info!("payment reconciliation loop stopped");
        });

        ChoreHandle { shutdown, task }
    }

    /// One reconciliation pass. Every error ends the pass early with nothing
    /// further written; the caller retries on the next interval from
    /// recomputed state.
    pub async fn run_once(&self) -> Result<TickOutcome, ChoreError> {
        if self.config.disable_loop {
            debug!("skipping tick, reconciliation loop is disabled");
            return Ok(TickOutcome::Disabled);
        }

        let from = match self.db.last_block(PaymentStatus::Confirmed).await {
            Ok(block_number) => block_number + 1,
            Err(DbError::NoPayments) => 0,
            Err(err) => return Err(err.into()),
        };

        let latest = self.client.payments(from).await?;
        if latest.payments.is_empty() {
            return Ok(TickOutcome::NoNewPayments);
        }

        let head = latest.latest_block.number;
        let mut batch = Vec::with_capacity(latest.payments.len());
        for payment in latest.payments {
            let status = if head - payment.block_number >= self.config.confirmations {
                PaymentStatus::Confirmed
            } else {
                PaymentStatus::Pending
            };

            batch.push(CachedPayment {
                from: payment.from,
                to: payment.to,
                token_value: Amount::from_base_units(payment.token_value, TOKEN),
                usd_value: Amount::from_decimal_rounded(payment.usd_value, USD_MICRO)?,
                status,
                block_hash: payment.block_hash,
                block_number: payment.block_number,
                transaction: payment.transaction,
                log_index: payment.log_index,
                timestamp: payment.timestamp,
            });
        }

        let confirmed = batch
            .iter()
            .filter(|p| p.status == PaymentStatus::Confirmed)
            .count();
        let pending = batch.len() - confirmed;

        // A previously cached pending row is never trusted: the pending set
        // is regenerated wholesale from this fetch. Confirmed rows are left
        // untouched.
        self.db.delete_pending().await?;

        if let Err(err) = self.db.insert_batch(batch).await {
            // The delete already landed, so pending rows are gone until a
            // later tick re-observes them. Operators must see this.
            error!(error = %err, "pending rows dropped without replacement batch");
            return Err(ChoreError::PendingSetDropped(err));
        }

        Ok(TickOutcome::Stored { confirmed, pending })
    }
}
