//! Injectable token store for OAuth session state.
//!
//! Replaces server-side session middleware with an explicit seam: the HTTP
//! layer records pending authorizations keyed by the CSRF `state` value and
//! stores exchanged tokens keyed by session id. The in-memory implementation
//! covers the process-scoped semantics of this service and its tests; a
//! durable implementation can be plugged in behind the same trait.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    error::Result,
    models::{OauthToken, SessionId},
};

/// Storage operations for OAuth session state.
///
/// `state` values are single-use: [`TokenStore::take_authorization`] consumes
/// the pending entry so a replayed callback cannot resolve a session twice.
/// The most recently completed authorization is tracked as the active token
/// for callers that carry no session of their own (the webhook path).
#[async_trait]
pub trait TokenStore: Send + Sync + 'static {
    /// Records a pending authorization: the `state` sent to the provider and
    /// the session it belongs to.
    async fn begin_authorization(&self, state: String, session: SessionId) -> Result<()>;

    /// Resolves and consumes the pending authorization for `state`.
    ///
    /// Returns `None` when the state is unknown, already used, or never
    /// issued by this process.
    async fn take_authorization(&self, state: &str) -> Result<Option<SessionId>>;

    /// Stores the token exchanged for a session and marks that session as
    /// the active one.
    async fn store_token(&self, session: SessionId, token: OauthToken) -> Result<()>;

    /// Returns the token held for a session, if any.
    async fn token(&self, session: SessionId) -> Result<Option<OauthToken>>;

    /// Returns the token of the most recently completed authorization.
    async fn active_token(&self) -> Result<Option<OauthToken>>;
}

#[derive(Debug, Default)]
struct Inner {
    pending: HashMap<String, SessionId>,
    tokens: HashMap<SessionId, OauthToken>,
    active: Option<SessionId>,
}

/// In-memory [`TokenStore`] keyed by session id.
///
/// State lives for the process lifetime only, matching the session semantics
/// of the service: tokens are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    inner: RwLock<Inner>,
}

impl MemoryTokenStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn begin_authorization(&self, state: String, session: SessionId) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.pending.insert(state, session);
        Ok(())
    }

    async fn take_authorization(&self, state: &str) -> Result<Option<SessionId>> {
        let mut inner = self.inner.write().await;
        Ok(inner.pending.remove(state))
    }

    async fn store_token(&self, session: SessionId, token: OauthToken) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.tokens.insert(session, token);
        inner.active = Some(session);
        Ok(())
    }

    async fn token(&self, session: SessionId) -> Result<Option<OauthToken>> {
        let inner = self.inner.read().await;
        Ok(inner.tokens.get(&session).cloned())
    }

    async fn active_token(&self) -> Result<Option<OauthToken>> {
        let inner = self.inner.read().await;
        Ok(inner.active.and_then(|session| inner.tokens.get(&session).cloned()))
    }
}
