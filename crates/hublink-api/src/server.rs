//! HTTP server configuration and request routing.
//!
//! Provides Axum server setup with middleware stack, graceful shutdown, and
//! the shared application state for the webhook and OAuth endpoints.
//! Requests flow through middleware in order:
//! 1. Request ID generation
//! 2. Request/response logging
//! 3. Timeout enforcement (30s default)
//! 4. Handler execution
//!
//! # Graceful Shutdown
//!
//! The server handles SIGTERM gracefully: it stops accepting new
//! connections and waits for in-flight requests before exiting.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{info, warn};
use uuid::Uuid;

use hublink_core::TokenStore;
use hublink_crm::{HubSpotClient, OauthClient, Result as CrmResult};

use crate::{config::Config, handlers};

/// Shared application state threaded through request handlers.
///
/// Constructed once at startup from the loaded [`Config`]; handlers receive
/// it via the Axum state extractor instead of touching process globals.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: Arc<Config>,
    /// CRM client adapter.
    pub crm: HubSpotClient,
    /// OAuth broker.
    pub oauth: OauthClient,
    /// Injectable token store holding OAuth session state.
    pub store: Arc<dyn TokenStore>,
}

impl AppState {
    /// Builds the application state, wiring the CRM client and OAuth broker
    /// from the configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if either HTTP client cannot be built.
    pub fn new(config: Config, store: Arc<dyn TokenStore>) -> CrmResult<Self> {
        let crm = HubSpotClient::new(config.to_client_config())?;
        let oauth = OauthClient::new(config.to_oauth_config())?;

        Ok(Self { config: Arc::new(config), crm, oauth, store })
    }
}

/// Creates the Axum router with all routes and middleware.
///
/// Sets up:
/// - The OAuth entry (`/`), callback (`/callback`), webhook (`/webhook`),
///   and health (`/health`) endpoints
/// - Request tracing and logging
/// - Timeout handling
/// - Shared application state
pub fn create_router(state: AppState) -> Router {
    let request_timeout = Duration::from_secs(state.config.request_timeout);

    Router::new()
        .route("/", get(handlers::begin_authorization))
        .route("/callback", get(handlers::oauth_callback))
        .route("/webhook", post(handlers::receive_contact))
        .route("/health", get(handlers::liveness_check))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(inject_request_id))
        .with_state(state)
}

/// Middleware to inject request ID into all responses.
///
/// Adds X-Request-Id header for tracing requests across services.
async fn inject_request_id(req: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();

    let mut req = req;
    req.extensions_mut().insert(request_id.clone());

    let mut response = next.run(req).await;

    if let Ok(header_value) = request_id.parse() {
        response.headers_mut().insert("X-Request-Id", header_value);
    }

    response
}

/// Starts the HTTP server with graceful shutdown support.
///
/// Binds to the specified address and serves requests until a shutdown
/// signal is received.
///
/// # Errors
///
/// Returns `std::io::Error` if the port is already in use or the network
/// interface is unavailable.
pub async fn start_server(state: AppState, addr: SocketAddr) -> Result<(), std::io::Error> {
    let app = create_router(state);

    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    info!("HTTP server listening on {}", actual_addr);

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    info!("HTTP server stopped gracefully");
    Ok(())
}

/// Waits for shutdown signal (CTRL+C or SIGTERM).
///
/// Enables graceful shutdown on:
/// - CTRL+C (SIGINT) - Development
/// - SIGTERM - Kubernetes/Docker
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received CTRL+C, starting graceful shutdown");
        },
        () = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }

    warn!("Waiting for in-flight requests to complete");
}
