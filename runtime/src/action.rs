//! Single-flight runner for one UI action (a button, a form submit).

use crate::flight::Flight;
use crate::notifier::Notifier;
use crate::options::ActionOptions;
use crate::outcome::report;
use activity_console_core::ApiError;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

/// Runs an async action with a loading flag and uniform reporting.
///
/// Clones share the loading state.
///
/// # Example
///
/// ```rust
/// use activity_console_core::ApiError;
/// use activity_console_runtime::{ActionOptions, ActionRunner, TracingNotifier};
/// use std::sync::Arc;
///
/// # async fn example() {
/// let save = ActionRunner::new(
///     Arc::new(TracingNotifier),
///     ActionOptions::new().success_message("Saved"),
/// );
///
/// let id = save.run(|| async { Ok::<_, ApiError>(42_u64) }).await;
/// assert_eq!(id, Some(42));
/// assert!(!save.is_loading());
/// # }
/// ```
pub struct ActionRunner<T> {
    flight: Arc<Flight>,
    options: Arc<ActionOptions<T>>,
    notifier: Arc<dyn Notifier>,
}

impl<T> ActionRunner<T> {
    /// Create a runner.
    #[must_use]
    pub fn new(notifier: Arc<dyn Notifier>, options: ActionOptions<T>) -> Self {
        Self {
            flight: Flight::new(),
            options: Arc::new(options),
            notifier,
        }
    }

    /// Whether a run is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.flight.is_loading()
    }

    /// Watch the loading flag.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.flight.subscribe()
    }

    /// The runner's options.
    #[must_use]
    pub fn options(&self) -> &ActionOptions<T> {
        &self.options
    }

    /// Run `f` and report its outcome.
    ///
    /// Returns `None` when the call is rejected because a run is already in
    /// flight (`f` is not invoked) or when `f` fails. Failures are reported
    /// through the notifier, never returned.
    pub async fn run<F, Fut>(&self, f: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let Some(_guard) = self.flight.enter(self.options.prevent_concurrent) else {
            metrics::counter!("action.rejected").increment(1);
            tracing::debug!("Action already in flight, ignoring call");
            return None;
        };

        let result = f().await;
        report(result, &self.options, self.notifier.as_ref())
    }
}

impl<T> Clone for ActionRunner<T> {
    fn clone(&self) -> Self {
        Self {
            flight: Arc::clone(&self.flight),
            options: Arc::clone(&self.options),
            notifier: Arc::clone(&self.notifier),
        }
    }
}

impl<T> std::fmt::Debug for ActionRunner<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRunner")
            .field("loading", &self.is_loading())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
