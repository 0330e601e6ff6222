//! Extension points the transport calls without depending on UI or routing.
//!
//! Both slots are optional and settable once. Handlers are invoked
//! best-effort: a panicking handler is logged and the request path carries on.

use activity_console_core::ApiError;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, OnceLock};
use thiserror::Error;

/// Called after session teardown on an unauthorized outcome.
pub type UnauthorizedHandler = Arc<dyn Fn(&ApiError) + Send + Sync>;

/// Called with every classified failure before it is returned.
pub type ErrorObserver = Arc<dyn Fn(&ApiError) + Send + Sync>;

/// Hook registration errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HookError {
    /// The slot was already filled
    #[error("{0} handler is already registered")]
    AlreadySet(&'static str),
}

/// Registered handlers, shared by every clone of a client.
#[derive(Default)]
pub struct Hooks {
    on_unauthorized: OnceLock<UnauthorizedHandler>,
    on_http_error: OnceLock<ErrorObserver>,
}

impl Hooks {
    /// Create an empty set of hooks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the unauthorized handler.
    ///
    /// # Errors
    ///
    /// Returns `HookError::AlreadySet` if a handler was registered before.
    pub fn set_on_unauthorized<F>(&self, handler: F) -> Result<(), HookError>
    where
        F: Fn(&ApiError) + Send + Sync + 'static,
    {
        self.on_unauthorized
            .set(Arc::new(handler))
            .map_err(|_| HookError::AlreadySet("unauthorized"))
    }

    /// Register the error observer.
    ///
    /// # Errors
    ///
    /// Returns `HookError::AlreadySet` if an observer was registered before.
    pub fn set_on_http_error<F>(&self, observer: F) -> Result<(), HookError>
    where
        F: Fn(&ApiError) + Send + Sync + 'static,
    {
        self.on_http_error
            .set(Arc::new(observer))
            .map_err(|_| HookError::AlreadySet("http error"))
    }

    pub(crate) fn unauthorized(&self, error: &ApiError) {
        if let Some(handler) = self.on_unauthorized.get() {
            invoke("unauthorized", handler, error);
        }
    }

    pub(crate) fn http_error(&self, error: &ApiError) {
        if let Some(observer) = self.on_http_error.get() {
            invoke("http error", observer, error);
        }
    }
}

fn invoke(slot: &'static str, handler: &Arc<dyn Fn(&ApiError) + Send + Sync>, error: &ApiError) {
    if catch_unwind(AssertUnwindSafe(|| handler(error))).is_err() {
        tracing::error!(hook = slot, kind = %error.kind(), "Hook panicked, ignoring");
    }
}

impl std::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hooks")
            .field("on_unauthorized", &self.on_unauthorized.get().is_some())
            .field("on_http_error", &self.on_http_error.get().is_some())
            .finish()
    }
}
