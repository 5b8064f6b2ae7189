mod api;
mod bootstrap;
mod config;
mod error;
mod monetary;
mod server;
mod tokenscan;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,tower_http=debug,tokenpay_backend=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("starting tokenpay backend");

    dotenv::dotenv().ok();
    let config = config::Config::from_env().context("loading configuration")?;

    let (state, chore_handle) = bootstrap::initialize(&config).await?;

    server::run_server(server::create_app(state), &config.bind_address).await?;

    // Server exited on the shutdown signal; stop the reconciliation loop at
    // a tick boundary before the process goes down.
    chore_handle.stop().await;
    info!("tokenpay backend stopped");

    Ok(())
}
