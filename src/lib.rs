//! Ownership Desk - Tadawul ownership and earnings dashboard
//!
//! A local gateway that merges the scraped foreign ownership table with
//! extracted retained/reinvested earnings figures, keeps the unified table
//! consistent under corrections and refreshes, and serves the dashboard UI
//! API. The Python extraction backend is consumed purely over REST.

pub mod backend;
pub mod config;
pub mod error;
pub mod events;
pub mod extraction;
pub mod model;
pub mod reconcile;
pub mod server;
pub mod services;
pub mod sources;
pub mod state;
pub mod view;

use config::AppConfig;
use server::DashboardServer;
use services::DashboardService;
use state::AppState;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize and run the dashboard until interrupted
pub async fn run() -> anyhow::Result<()> {
    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ownership_desk_lib=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Ownership Desk...");

    let config = AppConfig::from_env()?;
    tracing::info!("Extraction backend: {}", config.backend_url);

    let state = Arc::new(AppState::new(config)?);

    // First table build; unavailable sources degrade to an empty dataset
    let row_count = DashboardService::rebuild(&state).await?;
    tracing::info!("Initial reconciliation produced {} rows", row_count);

    let mut server = DashboardServer::new(state);
    server.start().await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    server.stop();

    Ok(())
}
