//! Bilan API Server
//!
//! Serves balance sheets generated from project ledgers.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bilan_api::{AppState, create_router};
use bilan_core::source::LedgerLoader;
use bilan_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bilan=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let loader = LedgerLoader::from_config(&config.ledger.source)
        .context("Failed to initialize ledger source")?;
    info!(
        provider = loader.provider_name(),
        debt_policy = %config.bilan.debt_policy,
        "Ledger source configured"
    );

    let state = AppState::new(Arc::new(loader), config.bilan.debt_policy);
    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
