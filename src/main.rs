//! Hublink contact sync service.
//!
//! Main entry point for the hublink server. Initializes logging, loads
//! configuration, wires the application state, and serves HTTP until a
//! shutdown signal arrives.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use hublink_api::{start_server, AppState, Config};
use hublink_core::MemoryTokenStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with structured logging
    init_tracing();

    info!("Starting hublink contact sync service");

    // Load configuration from defaults, config file, and environment
    let config = Config::load()?;
    info!(
        host = %config.host,
        port = config.port,
        redirect_uri = %config.oauth_redirect_uri,
        client_secret = config.client_secret_masked(),
        hubspot_api_key = config.hubspot_api_key_masked(),
        "Configuration loaded"
    );

    let addr = config.parse_server_addr()?;

    // Token store is process-scoped: tokens are lost on restart.
    let store = Arc::new(MemoryTokenStore::new());

    let state = AppState::new(config, store).context("Failed to build application state")?;

    info!(addr = %addr, "Hublink is ready to receive webhooks");

    start_server(state, addr).await.context("Server failed")?;

    info!("Hublink shutdown complete");
    Ok(())
}

/// Initializes tracing with environment-based configuration.
fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info,hublink=debug,tower_http=debug"))
        .expect("Invalid RUST_LOG environment variable");

    let fmt_layer = fmt::layer().with_target(true).with_file(true).with_line_number(true);

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}
