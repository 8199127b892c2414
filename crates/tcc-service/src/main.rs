//! TCC Ledger Service - HTTP API for the municipal token ledger
//!
//! This is the main entry point for the tcc-ledger service.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tcc_service::{create_router, spawn_expiry_sweep, AppState, ServiceConfig};
use tcc_store::RocksStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tcc=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting TCC Ledger Service");

    // Load configuration from environment
    let config = ServiceConfig::from_env();

    tracing::info!(
        listen_addr = %config.listen_addr,
        data_dir = %config.data_dir,
        token_ttl_seconds = %config.token_ttl_seconds,
        sweep_interval_seconds = %config.sweep_interval_seconds,
        service_auth_configured = %config.service_api_key.is_some(),
        "Service configuration loaded"
    );

    // Initialize RocksDB store
    tracing::info!(path = %config.data_dir, "Opening RocksDB store");
    let store = Arc::new(RocksStore::open(&config.data_dir)?);

    // Build app state and seed the default reward rules on first run
    let state = AppState::new(store, config.clone());
    state.ensure_reward_config()?;

    // Start the background expiry sweep
    let sweep_state = Arc::new(state.clone());
    spawn_expiry_sweep(sweep_state);

    // Create the router
    let app = create_router(state);
    tracing::info!("Router configured with all API endpoints");

    // Start HTTP server
    tracing::info!(listen_addr = %config.listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
