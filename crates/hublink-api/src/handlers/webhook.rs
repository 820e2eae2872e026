//! Webhook handler forwarding contact data into the CRM.
//!
//! Accepts a JSON payload with `email` and `name`, validates presence of
//! both fields before any side effect, and delegates to the CRM adapter's
//! email-keyed upsert. The confirmation is plain text naming the email, as
//! webhook senders expect a human-readable acknowledgement.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::{info, instrument, warn};

use hublink_core::Contact;

use crate::{error::ApiError, server::AppState};

/// Request body for the contact webhook.
///
/// Both fields are required; options are used so absence maps to the fixed
/// 400 message instead of a deserializer rejection.
#[derive(Debug, Deserialize)]
pub struct WebhookRequest {
    /// Contact email, the CRM lookup key.
    pub email: Option<String>,
    /// Contact first name.
    pub name: Option<String>,
}

/// Receives a contact payload and upserts it into the CRM.
///
/// # Errors
///
/// - 400 with a fixed message when `email` or `name` is missing
/// - 500 with the underlying error text on CRM or credential failure
#[instrument(name = "receive_contact", skip(app, payload))]
pub async fn receive_contact(
    State(app): State<AppState>,
    Json(payload): Json<WebhookRequest>,
) -> Result<Response, ApiError> {
    let (Some(email), Some(name)) = (payload.email, payload.name) else {
        warn!("Webhook payload missing required fields");
        return Err(ApiError::MissingFields);
    };

    let access_token = resolve_credentials(&app).await?;

    let contact = Contact::new(email, name);
    let outcome =
        app.crm.upsert_contact(&access_token, &contact).await.map_err(ApiError::Crm)?;

    let verb = if outcome.was_created() { "created" } else { "updated" };
    info!(email = %contact.email, contact_id = %outcome.record().id, "Contact {verb}");

    Ok((
        StatusCode::OK,
        format!("Contact with email {} {verb} successfully.", contact.email),
    )
        .into_response())
}

/// Resolves the bearer credential for CRM calls.
///
/// The token of the most recently completed OAuth authorization wins; the
/// configured private-app API key is the fallback when no authorization has
/// completed in this process.
async fn resolve_credentials(app: &AppState) -> Result<String, ApiError> {
    if let Some(token) = app.store.active_token().await? {
        return Ok(token.access_token);
    }

    if !app.config.hubspot_api_key.is_empty() {
        return Ok(app.config.hubspot_api_key.clone());
    }

    Err(ApiError::MissingCredentials)
}
