//! Typed request errors and their HTTP status mapping.
//!
//! Two kinds of failure exist at this surface: client input errors on the
//! webhook (missing required fields, 400 with a fixed message) and
//! remote/integration failures (OAuth or CRM, 500 with the underlying error
//! text). All failures are terminal for the request.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use hublink_core::StoreError;
use hublink_crm::CrmError;

/// Errors surfaced by the HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The webhook body lacked a required field.
    #[error("Missing required fields: email and name.")]
    MissingFields,

    /// The callback arrived without a state parameter.
    #[error("OAuth callback missing the state parameter")]
    MissingState,

    /// The callback state matched no pending authorization.
    #[error("OAuth state mismatch: no pending authorization for the provided state")]
    StateMismatch,

    /// The callback arrived without an authorization code.
    #[error("OAuth callback missing the authorization code")]
    MissingCode,

    /// The provider reported an authorization error on the callback.
    #[error("authorization failed at provider: {0}")]
    ProviderDenied(String),

    /// No OAuth token and no configured API key to call the CRM with.
    #[error("no HubSpot credentials available: complete the OAuth flow or set HUBSPOT_API_KEY")]
    MissingCredentials,

    /// OAuth broker failure (URL construction or token exchange).
    #[error(transparent)]
    Oauth(CrmError),

    /// CRM API failure during the upsert.
    #[error(transparent)]
    Crm(CrmError),

    /// Token store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingFields => StatusCode::BAD_REQUEST,
            Self::MissingState
            | Self::StateMismatch
            | Self::MissingCode
            | Self::ProviderDenied(_)
            | Self::MissingCredentials
            | Self::Oauth(_)
            | Self::Crm(_)
            | Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}
