//! Runner for actions over a multi-row selection.

use crate::flight::Flight;
use crate::notifier::Notifier;
use crate::options::BatchOptions;
use crate::outcome::report;
use activity_console_core::ApiError;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

/// Runs an action over a selection of items.
///
/// Behaves as [`ActionRunner`](crate::ActionRunner) once the selection check
/// passes.
pub struct BatchActionRunner<I, T> {
    flight: Arc<Flight>,
    options: Arc<BatchOptions<T>>,
    notifier: Arc<dyn Notifier>,
    _items: std::marker::PhantomData<fn(Vec<I>)>,
}

impl<I, T> BatchActionRunner<I, T> {
    /// Create a runner.
    #[must_use]
    pub fn new(notifier: Arc<dyn Notifier>, options: BatchOptions<T>) -> Self {
        Self {
            flight: Flight::new(),
            options: Arc::new(options),
            notifier,
            _items: std::marker::PhantomData,
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

    /// Run `f` over `items` and report its outcome.
    ///
    /// An empty selection is refused with a single warning before any
    /// concurrency check when `require_selection` is set.
    pub async fn run<F, Fut>(&self, items: Vec<I>, f: F) -> Option<T>
    where
        F: FnOnce(Vec<I>) -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        if items.is_empty() && self.options.require_selection {
            self.notifier.warning(&self.options.empty_selection_message);
            return None;
        }

        let action = &self.options.action;
        let Some(_guard) = self.flight.enter(action.prevent_concurrent) else {
            metrics::counter!("action.rejected").increment(1);
            tracing::debug!(selected = items.len(), "Batch action already in flight, ignoring call");
            return None;
        };

        tracing::debug!(selected = items.len(), "Running batch action");
        let result = f(items).await;
        report(result, action, self.notifier.as_ref())
    }
}

impl<I, T> Clone for BatchActionRunner<I, T> {
    fn clone(&self) -> Self {
        Self {
            flight: Arc::clone(&self.flight),
            options: Arc::clone(&self.options),
            notifier: Arc::clone(&self.notifier),
            _items: std::marker::PhantomData,
        }
    }
}

impl<I, T> std::fmt::Debug for BatchActionRunner<I, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchActionRunner")
            .field("loading", &self.is_loading())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
