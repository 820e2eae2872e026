#![allow(dead_code)]
//! Shared test environment for API integration tests.
//!
//! Wires the router against a wiremock server standing in for both the
//! HubSpot CRM API and its OAuth token endpoint, with the in-memory token
//! store shared across requests of a single test.

use std::sync::Arc;

use axum::{body::Body, http::Request, response::Response, Router};
use tower::ServiceExt;
use wiremock::MockServer;

use hublink_api::{create_router, AppState, Config};
use hublink_core::MemoryTokenStore;

/// A router factory plus the mock provider and shared store behind it.
pub struct TestApp {
    /// Mock server answering CRM and token endpoint requests.
    pub hubspot: MockServer,
    /// Token store shared by every router built from this app.
    pub store: Arc<MemoryTokenStore>,
    /// Configuration the routers are built from; mutate before `router()`.
    pub config: Config,
}

impl TestApp {
    /// Starts a mock HubSpot server and builds a config pointing at it.
    pub async fn start() -> Self {
        let hubspot = MockServer::start().await;

        let mut config = Config::default();
        config.client_id = "test-client".to_string();
        config.client_secret = "test-secret".to_string();
        config.hubspot_base_url = hubspot.uri();
        config.oauth_token_url = format!("{}/oauth/v1/token", hubspot.uri());

        Self { hubspot, store: Arc::new(MemoryTokenStore::new()), config }
    }

    /// Builds a router over the current config and the shared store.
    pub fn router(&self) -> Router {
        let state = AppState::new(self.config.clone(), self.store.clone())
            .expect("failed to build application state");
        create_router(state)
    }

    /// Sends a webhook POST with the given JSON body.
    pub async fn post_webhook(&self, body: serde_json::Value) -> Response {
        let request = Request::builder()
            .method("POST")
            .uri("/webhook")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        self.router().oneshot(request).await.expect("failed to make request")
    }

    /// Sends a GET request to the given path.
    pub async fn get(&self, uri: &str) -> Response {
        let request = Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap();

        self.router().oneshot(request).await.expect("failed to make request")
    }
}

/// Reads a response body into a string.
pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    String::from_utf8_lossy(&bytes).into_owned()
}
