//! Runner options.
//!
//! # Default Values
//!
//! - `success_message`: none
//! - `error_message`: none (the kind's default message applies)
//! - `prevent_concurrent`: `true`
//! - `silent_unauthorized`: `true`
//! - `require_selection` (batch): `true`
//! - `empty_selection_message` (batch): [`DEFAULT_EMPTY_SELECTION_MESSAGE`]

use activity_console_core::ApiError;
use std::sync::Arc;

/// Warning shown when a batch action runs with nothing selected.
pub const DEFAULT_EMPTY_SELECTION_MESSAGE: &str = "Please select at least one item";

/// A message that is either fixed or derived from a value.
pub enum Message<A: ?Sized> {
    /// Fixed text
    Text(String),
    /// Text computed from the action result or error
    Render(Arc<dyn Fn(&A) -> String + Send + Sync>),
}

impl<A: ?Sized> Message<A> {
    /// Produce the text for `value`.
    #[must_use]
    pub fn render(&self, value: &A) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Render(f) => f(value),
        }
    }
}

impl<A: ?Sized> Clone for Message<A> {
    fn clone(&self) -> Self {
        match self {
            Self::Text(text) => Self::Text(text.clone()),
            Self::Render(f) => Self::Render(Arc::clone(f)),
        }
    }
}

impl<A: ?Sized> std::fmt::Debug for Message<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Render(_) => f.write_str("Render(..)"),
        }
    }
}

impl<A: ?Sized> From<&str> for Message<A> {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl<A: ?Sized> From<String> for Message<A> {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// Returned by `on_success` to decide whether the success message is shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SuccessFlow {
    /// Show the success message, if configured
    #[default]
    Notify,
    /// The callback reported the outcome itself
    Silent,
}

/// Returned by `on_error` to decide whether the runner reports the error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorFlow {
    /// Report the error to the user
    #[default]
    Unhandled,
    /// The callback handled the error
    Handled,
}

/// Callback run before success reporting.
pub type SuccessCallback<T> = Arc<dyn Fn(&T) -> SuccessFlow + Send + Sync>;

/// Callback run before error reporting.
pub type ErrorCallback = Arc<dyn Fn(&ApiError) -> ErrorFlow + Send + Sync>;

/// Options shared by every runner.
///
/// For [`KeyedActionRunner`](crate::KeyedActionRunner) the concurrency
/// guard applies per key.
pub struct ActionOptions<T> {
    pub(crate) success_message: Option<Message<T>>,
    pub(crate) error_message: Option<Message<ApiError>>,
    pub(crate) on_success: Option<SuccessCallback<T>>,
    pub(crate) on_error: Option<ErrorCallback>,
    pub(crate) prevent_concurrent: bool,
    pub(crate) silent_unauthorized: bool,
}

impl<T> ActionOptions<T> {
    /// Options with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            success_message: None,
            error_message: None,
            on_success: None,
            on_error: None,
            prevent_concurrent: true,
            silent_unauthorized: true,
        }
    }

    /// Message shown after a successful run.
    #[must_use]
    pub fn success_message(mut self, message: impl Into<Message<T>>) -> Self {
        self.success_message = Some(message.into());
        self
    }

    /// Success message derived from the result.
    #[must_use]
    pub fn success_message_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        self.success_message = Some(Message::Render(Arc::new(f)));
        self
    }

    /// Fallback message for errors that carry no backend text.
    #[must_use]
    pub fn error_message(mut self, message: impl Into<Message<ApiError>>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    /// Fallback error message derived from the error.
    #[must_use]
    pub fn error_message_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&ApiError) -> String + Send + Sync + 'static,
    {
        self.error_message = Some(Message::Render(Arc::new(f)));
        self
    }

    /// Callback run with the result before the success message.
    #[must_use]
    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: Fn(&T) -> SuccessFlow + Send + Sync + 'static,
    {
        self.on_success = Some(Arc::new(f));
        self
    }

    /// Callback run with the error before it is reported.
    #[must_use]
    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(&ApiError) -> ErrorFlow + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(f));
        self
    }

    /// Reject calls made while a run is in flight.
    #[must_use]
    pub fn prevent_concurrent(mut self, prevent: bool) -> Self {
        self.prevent_concurrent = prevent;
        self
    }

    /// Suppress user-facing messages for `UNAUTHORIZED` failures.
    #[must_use]
    pub fn silent_unauthorized(mut self, silent: bool) -> Self {
        self.silent_unauthorized = silent;
        self
    }

    /// Whether overlapping calls are rejected.
    #[must_use]
    pub const fn prevents_concurrent(&self) -> bool {
        self.prevent_concurrent
    }
}

impl<T> Default for ActionOptions<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for ActionOptions<T> {
    fn clone(&self) -> Self {
        Self {
            success_message: self.success_message.clone(),
            error_message: self.error_message.clone(),
            on_success: self.on_success.clone(),
            on_error: self.on_error.clone(),
            prevent_concurrent: self.prevent_concurrent,
            silent_unauthorized: self.silent_unauthorized,
        }
    }
}

impl<T> std::fmt::Debug for ActionOptions<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionOptions")
            .field("success_message", &self.success_message)
            .field("error_message", &self.error_message)
            .field("on_success", &self.on_success.is_some())
            .field("on_error", &self.on_error.is_some())
            .field("prevent_concurrent", &self.prevent_concurrent)
            .field("silent_unauthorized", &self.silent_unauthorized)
            .finish()
    }
}

/// Options for [`BatchActionRunner`](crate::BatchActionRunner).
pub struct BatchOptions<T> {
    pub(crate) action: ActionOptions<T>,
    pub(crate) require_selection: bool,
    pub(crate) empty_selection_message: String,
}

impl<T> BatchOptions<T> {
    /// Options with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::from(ActionOptions::new())
    }

    /// Replace the shared action options.
    #[must_use]
    pub fn action(mut self, action: ActionOptions<T>) -> Self {
        self.action = action;
        self
    }

    /// Refuse to run with an empty selection.
    #[must_use]
    pub fn require_selection(mut self, require: bool) -> Self {
        self.require_selection = require;
        self
    }

    /// Warning shown for an empty selection.
    #[must_use]
    pub fn empty_selection_message(mut self, message: impl Into<String>) -> Self {
        self.empty_selection_message = message.into();
        self
    }
}

impl<T> From<ActionOptions<T>> for BatchOptions<T> {
    fn from(action: ActionOptions<T>) -> Self {
        Self {
            action,
            require_selection: true,
            empty_selection_message: DEFAULT_EMPTY_SELECTION_MESSAGE.to_string(),
        }
    }
}

impl<T> Default for BatchOptions<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for BatchOptions<T> {
    fn clone(&self) -> Self {
        Self {
            action: self.action.clone(),
            require_selection: self.require_selection,
            empty_selection_message: self.empty_selection_message.clone(),
        }
    }
}

impl<T> std::fmt::Debug for BatchOptions<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchOptions")
            .field("action", &self.action)
            .field("require_selection", &self.require_selection)
            .field("empty_selection_message", &self.empty_selection_message)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ActionOptions::<u32>::default();
        assert!(options.prevents_concurrent());
        assert!(options.silent_unauthorized);
        assert!(options.success_message.is_none());

        let batch = BatchOptions::<u32>::default();
        assert!(batch.require_selection);
        assert_eq!(batch.empty_selection_message, DEFAULT_EMPTY_SELECTION_MESSAGE);
    }

    #[test]
    fn test_messages_render() {
        let fixed: Message<u32> = "已保存".into();
        assert_eq!(fixed.render(&7), "已保存");

        let options = ActionOptions::<u32>::new().success_message_with(|n| format!("导入 {n} 条"));
        let rendered = options.success_message.as_ref().map(|m| m.render(&12));
        assert_eq!(rendered.as_deref(), Some("导入 12 条"));
    }
}
