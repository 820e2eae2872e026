//! OAuth2 authorization-code broker for the HubSpot provider.
//!
//! Builds the authorization URL the browser is redirected to, and runs the
//! authorization_code and refresh_token grants against the token endpoint.
//! State generation and correlation live with the caller; this module only
//! carries the `state` value through to the provider.

use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use hublink_core::OauthToken;

use crate::error::{CrmError, Result};

/// Configuration for the OAuth broker.
#[derive(Debug, Clone)]
pub struct OauthConfig {
    /// OAuth application client id.
    pub client_id: String,
    /// OAuth application client secret.
    pub client_secret: String,
    /// Provider consent page URL.
    pub authorize_url: String,
    /// Token endpoint URL for code exchange and refresh.
    pub token_url: String,
    /// Redirect URI registered with the provider.
    pub redirect_uri: String,
    /// Space-separated scopes requested during authorization.
    pub scopes: String,
}

/// OAuth2 client for the authorization-code grant.
#[derive(Debug, Clone)]
pub struct OauthClient {
    http: reqwest::Client,
    config: OauthConfig,
}

/// Token endpoint success payload.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<u64>,
}

/// Token endpoint error payload.
#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: Option<String>,
    error_description: Option<String>,
}

impl OauthClient {
    /// Creates a broker for the given provider configuration.
    ///
    /// # Errors
    ///
    /// Returns `CrmError::Configuration` if the HTTP client cannot be built.
    pub fn new(config: OauthConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| CrmError::configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Builds the authorization URL carrying the given CSRF `state`.
    ///
    /// # Errors
    ///
    /// Returns `CrmError::Configuration` if the configured authorize URL is
    /// not parseable.
    pub fn authorize_url(&self, state: &str) -> Result<String> {
        let url = Url::parse_with_params(&self.config.authorize_url, &[
            ("client_id", self.config.client_id.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("response_type", "code"),
            ("scope", self.config.scopes.as_str()),
            ("state", state),
        ])
        .map_err(|e| {
            CrmError::configuration(format!(
                "invalid authorize URL {}: {e}",
                self.config.authorize_url
            ))
        })?;

        Ok(url.into())
    }

    /// Exchanges an authorization code for a token pair.
    pub async fn exchange_code(&self, code: &str) -> Result<OauthToken> {
        debug!(token_url = %self.config.token_url, "Exchanging authorization code");

        let token = self
            .request_token(&[
                ("grant_type", "authorization_code"),
                ("client_id", &self.config.client_id),
                ("client_secret", &self.config.client_secret),
                ("redirect_uri", &self.config.redirect_uri),
                ("code", code),
            ])
            .await?;

        info!("Authorization code exchange succeeded");
        Ok(token)
    }

    /// Runs the refresh_token grant for an existing token pair.
    ///
    /// Nothing in the request path calls this automatically; it exposes the
    /// refresh parameters for callers that manage token lifetime themselves.
    pub async fn refresh(&self, refresh_token: &str) -> Result<OauthToken> {
        debug!(token_url = %self.config.token_url, "Refreshing access token");

        self.request_token(&[
            ("grant_type", "refresh_token"),
            ("client_id", &self.config.client_id),
            ("client_secret", &self.config.client_secret),
            ("refresh_token", refresh_token),
        ])
        .await
    }

    /// POSTs a form-encoded grant request and decodes the token response.
    async fn request_token(&self, params: &[(&str, &str)]) -> Result<OauthToken> {
        let response = self
            .http
            .post(&self.config.token_url)
            .form(params)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    CrmError::network(format!("connection failed: {e}"))
                } else {
                    CrmError::network(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CrmError::network(format!("failed to read token response: {e}")))?;

        if !status.is_success() {
            return Err(CrmError::token_exchange(describe_token_error(status.as_u16(), &body)));
        }

        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| CrmError::decode(format!("malformed token response: {e}")))?;

        Ok(OauthToken::new(token.access_token, token.refresh_token, token.expires_in.unwrap_or(3600)))
    }
}

/// Renders a token endpoint failure, preferring the provider's structured
/// error payload over the raw body.
fn describe_token_error(status: u16, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<TokenErrorResponse>(body) {
        if let Some(error) = parsed.error {
            let description = parsed.error_description.unwrap_or_else(|| "no description".to_string());
            return format!("{error}: {description}");
        }
    }

    format!("HTTP {status}: {body}")
}
