//! # Activity Console Testing
//!
//! Test doubles and fixtures shared by the activity console crates.
//!
//! This crate provides:
//! - [`RecordingNotifier`]: captures everything a runner reports
//! - [`CallLog`]: records hook invocations
//! - [`envelope`]: backend response bodies
//! - [`init_test_tracing`]: one-shot `tracing` setup for tests
//!
//! ## Example
//!
//! ```
//! use activity_console_runtime::{ActionOptions, ActionRunner};
//! use activity_console_testing::RecordingNotifier;
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let notifier = Arc::new(RecordingNotifier::new());
//! let runner = ActionRunner::<u32>::new(notifier.clone(), ActionOptions::new().success_message("ok"));
//! runner.run(|| async { Ok(1) }).await;
//! assert_eq!(notifier.successes(), vec!["ok".to_string()]);
//! # }
//! ```

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Mock implementations of the runtime's collaborator traits.
pub mod mocks {
    use activity_console_runtime::Notifier;
    use std::sync::{Arc, Mutex, PoisonError};

    /// Severity of a recorded notice.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Level {
        /// `Notifier::success`
        Success,
        /// `Notifier::error`
        Error,
        /// `Notifier::warning`
        Warning,
    }

    /// One message delivered to a [`RecordingNotifier`].
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Notice {
        /// Severity
        pub level: Level,
        /// Text shown to the user
        pub message: String,
    }

    /// Notifier that records every message in order.
    #[derive(Debug, Clone, Default)]
    pub struct RecordingNotifier {
        notices: CallLog<Notice>,
    }

    impl RecordingNotifier {
        /// Create an empty recorder.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Every notice so far.
        #[must_use]
        pub fn notices(&self) -> Vec<Notice> {
            self.notices.items()
        }

        /// Messages recorded at `level`.
        #[must_use]
        pub fn messages(&self, level: Level) -> Vec<String> {
            self.notices()
                .into_iter()
                .filter(|notice| notice.level == level)
                .map(|notice| notice.message)
                .collect()
        }

        /// Success messages.
        #[must_use]
        pub fn successes(&self) -> Vec<String> {
            self.messages(Level::Success)
        }

        /// Error messages.
        #[must_use]
        pub fn errors(&self) -> Vec<String> {
            self.messages(Level::Error)
        }

        /// Warning messages.
        #[must_use]
        pub fn warnings(&self) -> Vec<String> {
            self.messages(Level::Warning)
        }

        /// Whether nothing was reported.
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.notices.is_empty()
        }

        fn record(&self, level: Level, message: &str) {
            self.notices.push(Notice {
                level,
                message: message.to_string(),
            });
        }
    }

    impl Notifier for RecordingNotifier {
        fn success(&self, message: &str) {
            self.record(Level::Success, message);
        }

        fn error(&self, message: &str) {
            self.record(Level::Error, message);
        }

        fn warning(&self, message: &str) {
            self.record(Level::Warning, message);
        }
    }

    /// Shared, append-only log, e.g. for hook invocations.
    ///
    /// Clones append to the same log.
    #[derive(Debug)]
    pub struct CallLog<T> {
        items: Arc<Mutex<Vec<T>>>,
    }

    impl<T> CallLog<T> {
        /// Create an empty log.
        #[must_use]
        pub fn new() -> Self {
            Self {
                items: Arc::new(Mutex::new(Vec::new())),
            }
        }

        /// Append an item.
        pub fn push(&self, item: T) {
            self.lock().push(item);
        }

        /// Number of items.
        #[must_use]
        pub fn len(&self) -> usize {
            self.lock().len()
        }

        /// Whether the log is empty.
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.lock().is_empty()
        }

        /// Remove every item.
        pub fn clear(&self) {
            self.lock().clear();
        }

        fn lock(&self) -> std::sync::MutexGuard<'_, Vec<T>> {
            self.items.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    impl<T: Clone> CallLog<T> {
        /// Snapshot of the items in insertion order.
        #[must_use]
        pub fn items(&self) -> Vec<T> {
            self.lock().clone()
        }
    }

    impl<T> Clone for CallLog<T> {
        fn clone(&self) -> Self {
            Self {
                items: Arc::clone(&self.items),
            }
        }
    }

    impl<T> Default for CallLog<T> {
        fn default() -> Self {
            Self::new()
        }
    }
}

/// Backend response bodies.
pub mod envelope {
    use activity_console_core::Envelope;
    use serde_json::Value;

    /// Successful envelope around `data`.
    #[must_use]
    pub fn ok(data: Value) -> Value {
        Envelope::wrap(data).into_value()
    }

    /// Failed envelope with `code` and `msg`, `data: null`.
    #[must_use]
    pub fn fail(code: i64, msg: &str) -> Value {
        Envelope::failure(code, msg).into_value()
    }
}

/// Install a `tracing` subscriber for tests.
///
/// Honors `RUST_LOG`, defaulting to `warn` for the console crates. Safe to
/// call from every test; only the first call installs.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "activity_console_http=warn,activity_console_runtime=warn".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}

// Re-export commonly used items
pub use mocks::{CallLog, Level, Notice, RecordingNotifier};

#[cfg(test)]
mod tests {
    use super::*;
    use activity_console_core::{Payload, envelope::unwrap};
    use activity_console_runtime::Notifier;
    use serde_json::json;

    #[test]
    fn test_recording_notifier_keeps_order() {
        let notifier = RecordingNotifier::new();
        notifier.warning("请选择活动");
        notifier.error("网络异常");
        assert_eq!(
            notifier.notices(),
            vec![
                Notice {
                    level: Level::Warning,
                    message: "请选择活动".to_string()
                },
                Notice {
                    level: Level::Error,
                    message: "网络异常".to_string()
                },
            ]
        );
        assert!(notifier.successes().is_empty());
    }

    #[test]
    fn test_call_log_clones_share_items() {
        let log = CallLog::new();
        log.clone().push(1);
        log.push(2);
        assert_eq!(log.items(), vec![1, 2]);
        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn test_envelope_fixtures_are_recognized() {
        assert_eq!(unwrap(envelope::ok(json!({"id": 1}))), json!({"id": 1}));
        assert!(matches!(
            Payload::detect(envelope::fail(500, "internal error")),
            Payload::Wrapped(e) if !e.is_success()
        ));

        assert!(envelope::ok(json!([]))["timestamp"].is_i64());
    }
}
