use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use crate::api::handlers::AppState;
use crate::config::Config;
use crate::tokenscan::chore::{Chore, ChoreHandle};
use crate::tokenscan::client::TokenscanClient;
use crate::tokenscan::postgres::PostgresPaymentsDb;

/// Wires the database pool, tokenscan client and reconciliation chore, and
/// starts the chore loop. Returns the HTTP state and the chore handle so the
/// caller owns the stop lifecycle.
pub async fn initialize(config: &Config) -> anyhow::Result<(AppState, ChoreHandle)> {
    info!("initializing application components");

    let pool = initialize_database(&config.database_url).await?;

    let db = Arc::new(PostgresPaymentsDb::new(pool));
    let client = Arc::new(TokenscanClient::new(&config.tokenscan));

    let chore = Arc::new(Chore::new(
        client.clone(),
        db.clone(),
        config.tokenscan.clone(),
    ));
    let chore_handle = chore.start();

    let state = AppState { db, client };
    Ok((state, chore_handle))
}

async fn initialize_database(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
        .context("connecting to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("running migrations")?;

    info!("database pool initialized");
    Ok(pool)
}
