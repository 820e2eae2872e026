//! Core domain models and strongly-typed identifiers.
//!
//! Defines the contact record forwarded to the CRM, the OAuth token pair
//! held per session, and newtype ID wrappers for compile-time type safety.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Strongly-typed session identifier.
///
/// Wraps a UUID to prevent mixing with other ID types. A session is created
/// when the OAuth flow starts and follows the token obtained for it until
/// process shutdown.
///
/// # Example
///
/// ```
/// use hublink_core::models::SessionId;
/// let session = SessionId::new();
/// println!("OAuth session: {}", session);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Creates a new random session ID.
    ///
    /// Uses UUID v4 for globally unique identifiers without coordination.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for SessionId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Contact data forwarded to the CRM.
///
/// The email address is the lookup key for the upsert; there is no local
/// persistence, the CRM is the system of record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Email address, unique lookup key in the CRM.
    pub email: String,

    /// First name stored on the contact record.
    pub firstname: String,
}

impl Contact {
    /// Creates a contact from its two required attributes.
    pub fn new(email: impl Into<String>, firstname: impl Into<String>) -> Self {
        Self { email: email.into(), firstname: firstname.into() }
    }
}

/// Access/refresh token pair obtained from the OAuth provider.
///
/// Process-scoped only: tokens live in the token store and are lost on
/// restart. Expiry is tracked so callers can decide to run the refresh
/// grant; nothing refreshes automatically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OauthToken {
    /// Bearer token sent on CRM requests.
    pub access_token: String,

    /// Refresh token for the refresh_token grant, when the provider issued
    /// one.
    pub refresh_token: Option<String>,

    /// Lifetime in seconds reported by the token endpoint.
    pub expires_in: u64,

    /// When the token was obtained.
    pub obtained_at: DateTime<Utc>,
}

impl OauthToken {
    /// Creates a token stamped with the current time.
    pub fn new(access_token: String, refresh_token: Option<String>, expires_in: u64) -> Self {
        Self { access_token, refresh_token, expires_in, obtained_at: Utc::now() }
    }

    /// Instant after which the access token is no longer valid.
    ///
    /// Saturates at the maximum representable instant for lifetimes that do
    /// not fit the timeline.
    pub fn expires_at(&self) -> DateTime<Utc> {
        i64::try_from(self.expires_in)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|lifetime| self.obtained_at.checked_add_signed(lifetime))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Whether the access token has expired at the given instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }
}
