//! Process-wide session context.
//!
//! One bearer token shared by every outgoing request. Any 401 response
//! invalidates the token and notifies subscribers synchronously through a
//! watch channel, so dependent components (upload queue, fetchers) observe
//! the invalidation without polling.

use std::sync::RwLock;

use tokio::sync::watch;

/// Shared authentication state. Cheap to share via `Arc`.
#[derive(Debug)]
pub struct SessionContext {
    token: RwLock<Option<String>>,
    invalidated_tx: watch::Sender<bool>,
}

impl SessionContext {
    /// Create a session, optionally seeded with an existing token.
    pub fn new(token: Option<String>) -> Self {
        let (invalidated_tx, _) = watch::channel(false);
        Self {
            token: RwLock::new(token),
            invalidated_tx,
        }
    }

    /// Current bearer token, if authenticated.
    pub fn token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Install a token after a successful login. Resets the invalidation
    /// flag so a fresh session starts clean.
    pub fn set_token(&self, token: String) {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = Some(token);
        self.invalidated_tx.send_replace(false);
    }

    /// Explicit logout: forget the token without flagging an auth failure.
    pub fn clear(&self) {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = None;
    }

    /// Tear the session down after an authentication failure. The token is
    /// dropped and every subscriber is notified.
    pub fn invalidate(&self) {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = None;
        self.invalidated_tx.send_replace(true);
        tracing::warn!("session invalidated after authentication failure");
    }

    pub fn is_invalidated(&self) -> bool {
        *self.invalidated_tx.borrow()
    }

    /// Subscribe to invalidation changes. The receiver yields `true` once
    /// the session has been torn down.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.invalidated_tx.subscribe()
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new(None)
    }
}
