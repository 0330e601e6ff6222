//! User-facing notification sink.

/// Where runners deliver user-facing messages.
///
/// Implementations are typically a toast/message bar in the embedding UI.
pub trait Notifier: Send + Sync {
    /// A completed action.
    fn success(&self, message: &str);

    /// A failed action.
    fn error(&self, message: &str);

    /// A precondition that stopped an action from starting.
    fn warning(&self, message: &str);
}

/// [`Notifier`] that writes every message as a `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, message: &str) {
        tracing::info!(message, "Action succeeded");
    }

    fn error(&self, message: &str) {
        tracing::error!(message, "Action failed");
    }

    fn warning(&self, message: &str) {
        tracing::warn!(message, "Action not started");
    }
}
