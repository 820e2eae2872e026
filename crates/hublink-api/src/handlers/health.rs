//! Health check handler for service monitoring.
//!
//! The service holds no local state worth probing, so this is a liveness
//! check only: it reports that the HTTP server is responding.

use axum::{http::StatusCode, response::IntoResponse, Json};
use tracing::{debug, instrument};

/// Liveness check endpoint.
///
/// Returns a simple response indicating the service process is alive. This
/// is a minimal check that doesn't test external dependencies.
#[instrument(name = "liveness_check")]
pub async fn liveness_check() -> impl IntoResponse {
    debug!("Performing liveness check");

    let response = serde_json::json!({
        "status": "alive",
        "timestamp": chrono::Utc::now(),
        "service": "hublink",
        "version": env!("CARGO_PKG_VERSION"),
    });

    (StatusCode::OK, Json(response))
}
