//! Per-key runner for row actions (approve, delete, publish on one record).

use crate::flight::KeyedFlight;
use crate::notifier::Notifier;
use crate::options::ActionOptions;
use crate::outcome::report;
use activity_console_core::ApiError;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

/// Runs actions keyed by record identity.
///
/// Runs on different keys never block each other. With
/// `prevent_concurrent` (the default) a second run on a key that is still
/// in flight is rejected.
pub struct KeyedActionRunner<K, T> {
    flight: Arc<KeyedFlight<K>>,
    options: Arc<ActionOptions<T>>,
    notifier: Arc<dyn Notifier>,
}

impl<K, T> KeyedActionRunner<K, T>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
{
    /// Create a runner.
    #[must_use]
    pub fn new(notifier: Arc<dyn Notifier>, options: ActionOptions<T>) -> Self {
        Self {
            flight: KeyedFlight::new(),
            options: Arc::new(options),
            notifier,
        }
    }

    /// Whether `key` has a run in flight.
    #[must_use]
    pub fn is_loading(&self, key: &K) -> bool {
        self.flight.is_loading(key)
    }

    /// Whether any key has a run in flight.
    #[must_use]
    pub fn is_any_loading(&self) -> bool {
        self.flight.is_any_loading()
    }

    /// Keys with a run in flight, in no particular order.
    #[must_use]
    pub fn loading_keys(&self) -> Vec<K> {
        self.flight.loading_keys()
    }

    /// Forget the loading state of `key`.
    ///
    /// Runs already in flight on `key` finish normally but no longer block
    /// new runs.
    pub fn clear(&self, key: &K) {
        self.flight.clear(key);
    }

    /// Forget the loading state of every key.
    pub fn clear_all(&self) {
        self.flight.clear_all();
    }

    /// Run `f` for `key` and report its outcome.
    ///
    /// Returns `None` when rejected (`f` is not invoked) or when `f` fails.
    pub async fn run<F, Fut>(&self, key: K, f: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let Some(_guard) = self.flight.enter(&key, self.options.prevent_concurrent) else {
            metrics::counter!("action.rejected").increment(1);
            tracing::debug!(?key, "Action already in flight for key, ignoring call");
            return None;
        };

        let result = f().await;
        report(result, &self.options, self.notifier.as_ref())
    }
}

impl<K, T> Clone for KeyedActionRunner<K, T> {
    fn clone(&self) -> Self {
        Self {
            flight: Arc::clone(&self.flight),
            options: Arc::clone(&self.options),
            notifier: Arc::clone(&self.notifier),
        }
    }
}

impl<K, T> std::fmt::Debug for KeyedActionRunner<K, T>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyedActionRunner")
            .field("loading_keys", &self.loading_keys())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
