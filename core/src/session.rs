//! Session credential glue consumed by the HTTP client.
//!
//! The token and cached identity are process-wide state. They are written by
//! explicit login/logout flows and by the client's teardown path, and read by
//! every outgoing request.

use serde_json::Value;
use std::sync::{Arc, Mutex, PoisonError};

/// Storage for the credential token and the cached identity.
///
/// Durable storage is supplied by the embedding application; an in-memory
/// [`MemorySessionStore`] is provided for services and tests.
pub trait SessionStore: Send + Sync {
    /// The stored token, if any.
    fn token(&self) -> Option<String>;

    /// Replace the stored token.
    fn set_token(&self, token: String);

    /// The cached identity object, if any.
    fn identity(&self) -> Option<Value>;

    /// Replace the cached identity.
    fn set_identity(&self, identity: Value);

    /// Remove the token and the identity.
    ///
    /// Returns `true` if anything was stored before the call.
    fn clear(&self) -> bool;
}

#[derive(Debug, Default)]
struct Stored {
    token: Option<String>,
    identity: Option<Value>,
}

/// In-memory [`SessionStore`].
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    inner: Arc<Mutex<Stored>>,
}

impl MemorySessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `token`.
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        let store = Self::new();
        store.set_token(token.into());
        store
    }

    fn stored(&self) -> std::sync::MutexGuard<'_, Stored> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionStore for MemorySessionStore {
    fn token(&self) -> Option<String> {
        self.stored().token.clone()
    }

    fn set_token(&self, token: String) {
        self.stored().token = Some(token);
    }

    fn identity(&self) -> Option<Value> {
        self.stored().identity.clone()
    }

    fn set_identity(&self, identity: Value) {
        self.stored().identity = Some(identity);
    }

    fn clear(&self) -> bool {
        let mut stored = self.stored();
        let was_active = stored.token.is_some() || stored.identity.is_some();
        stored.token = None;
        stored.identity = None;
        was_active
    }
}

/// Shared handle over a [`SessionStore`].
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn SessionStore>,
}

impl Session {
    /// Wrap a store.
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// A session over a fresh [`MemorySessionStore`].
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySessionStore::new()))
    }

    /// Credential to attach to outgoing requests.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.store.token().filter(|token| !token.is_empty())
    }

    /// Cached identity of the signed-in user.
    #[must_use]
    pub fn identity(&self) -> Option<Value> {
        self.store.identity()
    }

    /// Whether a credential is stored.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.token().is_some()
    }

    /// Record a successful login.
    pub fn establish(&self, token: impl Into<String>, identity: Option<Value>) {
        self.store.set_token(token.into());
        if let Some(identity) = identity {
            self.store.set_identity(identity);
        }
        tracing::debug!("Session established");
    }

    /// Store a refreshed token returned by a domain call.
    pub fn refresh_token(&self, token: impl Into<String>) {
        self.store.set_token(token.into());
    }

    /// Clear the credential and cached identity.
    ///
    /// Idempotent. Returns `true` only for the call that moved the session
    /// from active to cleared.
    pub fn teardown(&self) -> bool {
        let was_active = self.store.clear();
        if was_active {
            metrics::counter!("session.teardown").increment(1);
            tracing::info!("Session torn down");
        }
        was_active
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("active", &self.is_active())
            .finish()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::in_memory()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_teardown_is_idempotent() {
        let session = Session::in_memory();
        session.establish("tok-1", Some(json!({"id": 1, "role": "admin"})));
        assert!(session.is_active());

        assert!(session.teardown());
        assert!(!session.teardown());
        assert!(!session.is_active());
        assert_eq!(session.identity(), None);
    }

    #[test]
    fn test_empty_token_is_not_attached() {
        let session = Session::new(Arc::new(MemorySessionStore::with_token("")));
        assert_eq!(session.token(), None);
    }

    #[test]
    fn test_clones_share_state() {
        let store = MemorySessionStore::with_token("abc");
        let session = Session::new(Arc::new(store.clone()));
        session.refresh_token("def");
        assert_eq!(store.token().as_deref(), Some("def"));

        session.teardown();
        assert_eq!(store.token(), None);
    }
}
