//! OAuth authorization-code flow endpoints.
//!
//! `/` starts the flow: a fresh session id and a random CSRF `state` are
//! recorded as a pending authorization, then the browser is redirected to
//! the provider consent page. `/callback` finishes it: the `state` resolves
//! (and consumes) the pending session, the code is exchanged at the token
//! endpoint, and the token lands in the store under that session.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use hublink_core::SessionId;

use crate::{error::ApiError, server::AppState};

/// Query parameters of the provider's authorization-code response.
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    /// Authorization code to exchange for a token.
    pub code: Option<String>,
    /// CSRF correlation state issued by `/`.
    pub state: Option<String>,
    /// Provider-reported error, when the user denied access.
    pub error: Option<String>,
    /// Human-readable description accompanying `error`.
    pub error_description: Option<String>,
}

/// Starts the OAuth flow with a 302 redirect to the provider.
///
/// # Errors
///
/// Returns 500 when the authorization URL cannot be built or the pending
/// authorization cannot be recorded.
#[instrument(name = "begin_authorization", skip(app))]
pub async fn begin_authorization(State(app): State<AppState>) -> Result<Response, ApiError> {
    let session = SessionId::new();
    let state = Uuid::new_v4().to_string();

    let location = app.oauth.authorize_url(&state).map_err(ApiError::Oauth)?;
    app.store.begin_authorization(state, session).await?;

    info!(session = %session, "Issued authorization redirect");

    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}

/// Completes the OAuth flow: validates `state`, exchanges the code, stores
/// the token.
///
/// # Errors
///
/// Returns 500 with the underlying error text when the state is missing or
/// matches no pending authorization, when the provider reported an error,
/// or when the token exchange fails.
#[instrument(name = "oauth_callback", skip(app, params))]
pub async fn oauth_callback(
    State(app): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Result<Response, ApiError> {
    if let Some(error) = params.error {
        let description =
            params.error_description.unwrap_or_else(|| "no description".to_string());
        warn!(error = %error, "Provider reported authorization error");
        return Err(ApiError::ProviderDenied(format!("{error}: {description}")));
    }

    let state = params.state.ok_or(ApiError::MissingState)?;

    let Some(session) = app.store.take_authorization(&state).await? else {
        warn!("Callback state matched no pending authorization");
        return Err(ApiError::StateMismatch);
    };

    let code = params.code.ok_or(ApiError::MissingCode)?;

    let token = app.oauth.exchange_code(&code).await.map_err(ApiError::Oauth)?;
    app.store.store_token(session, token).await?;

    info!(session = %session, "Authorization complete, token stored");

    Ok((
        StatusCode::OK,
        "Authorization successful. Contacts posted to /webhook will sync to HubSpot.",
    )
        .into_response())
}
