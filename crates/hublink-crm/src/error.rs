//! Error types for CRM and OAuth operations.
//!
//! Defines the failure conditions of outbound HubSpot traffic: network
//! problems, timeouts, non-success API responses, token exchange rejections,
//! and malformed payloads. There is no retry machinery: every failure is
//! terminal for the request that triggered it and is surfaced with its
//! message.

use thiserror::Error;

/// Result type alias for CRM operations.
pub type Result<T> = std::result::Result<T, CrmError>;

/// Error types for HubSpot API and OAuth operations.
#[derive(Debug, Clone, Error)]
pub enum CrmError {
    /// Network-level connectivity failure.
    #[error("network connection failed: {message}")]
    Network {
        /// Error message describing the network failure
        message: String,
    },

    /// HTTP request timeout exceeded.
    #[error("request timeout after {timeout_seconds}s")]
    Timeout {
        /// Number of seconds before the request timed out
        timeout_seconds: u64,
    },

    /// The API answered with a non-success status.
    #[error("HubSpot API error: HTTP {status}: {body}")]
    Api {
        /// HTTP status code returned by the API
        status: u16,
        /// Response body content
        body: String,
    },

    /// The token endpoint rejected the grant.
    #[error("token exchange failed: {message}")]
    TokenExchange {
        /// Provider error plus description when available
        message: String,
    },

    /// A response body could not be decoded.
    #[error("failed to decode response: {message}")]
    Decode {
        /// Decode error message
        message: String,
    },

    /// Invalid client or broker configuration.
    #[error("invalid configuration: {message}")]
    Configuration {
        /// Configuration error message
        message: String,
    },
}

impl CrmError {
    /// Creates a network error from a message.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network { message: message.into() }
    }

    /// Creates a timeout error.
    pub fn timeout(timeout_seconds: u64) -> Self {
        Self::Timeout { timeout_seconds }
    }

    /// Creates an API error from an HTTP response.
    pub fn api(status: u16, body: impl Into<String>) -> Self {
        Self::Api { status, body: body.into() }
    }

    /// Creates a token exchange error.
    pub fn token_exchange(message: impl Into<String>) -> Self {
        Self::TokenExchange { message: message.into() }
    }

    /// Creates a decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode { message: message.into() }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }
}
