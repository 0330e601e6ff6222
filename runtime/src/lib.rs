//! # Activity Console Runtime
//!
//! Action runners every console button, row action and batch action is
//! built on.
//!
//! A runner wraps one async call returning `Result<T, ApiError>` and adds:
//!
//! - **Single-flight execution**: a second call while one is in flight is
//!   rejected, not queued
//! - **Loading state**: readable at any time, released by an RAII guard on
//!   every exit path
//! - **Uniform reporting**: success and error messages go through a
//!   [`Notifier`]; `UNAUTHORIZED` failures stay silent by default because the
//!   HTTP client's unauthorized handler owns that flow
//!
//! Three shapes are provided:
//!
//! - [`ActionRunner`]: one action
//! - [`KeyedActionRunner`]: one lock per record key
//! - [`BatchActionRunner`]: an action over a selection, refusing empty ones
//!
//! Runners never classify errors; they only map an already-classified
//! [`ApiError`](activity_console_core::ApiError) to a user message.

pub mod action;
pub mod batch;
mod flight;
pub mod keyed;
pub mod notifier;
pub mod options;
mod outcome;

pub use action::ActionRunner;
pub use batch::BatchActionRunner;
pub use keyed::KeyedActionRunner;
pub use notifier::{Notifier, TracingNotifier};
pub use options::{
    ActionOptions, BatchOptions, DEFAULT_EMPTY_SELECTION_MESSAGE, ErrorCallback, ErrorFlow,
    Message, SuccessCallback, SuccessFlow,
};
