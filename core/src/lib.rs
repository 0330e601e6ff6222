//! # Activity Console Core
//!
//! Shared types for the activity console request core.
//!
//! This crate holds everything the HTTP layer and the action runners agree on:
//!
//! - **Error taxonomy**: [`ApiError`] with its closed [`ErrorKind`] classification
//! - **Response envelope**: structural detection of the backend's
//!   `{code, msg, data, timestamp}` wrapper ([`Payload`], [`Envelope`])
//! - **Auth policy**: the per-request [`AuthFailPolicy`] tag
//! - **Session glue**: the [`SessionStore`] seam and the idempotent
//!   [`Session::teardown`] operation
//!
//! ## Example
//!
//! ```
//! use activity_console_core::{ErrorKind, Payload};
//! use serde_json::json;
//!
//! let body = json!({ "code": 200, "msg": "ok", "data": [1, 2, 3] });
//! assert_eq!(Payload::detect(body).into_data(), json!([1, 2, 3]));
//!
//! assert_eq!(ErrorKind::from_status(403), Some(ErrorKind::Forbidden));
//! ```

pub mod envelope;
pub mod error;
pub mod policy;
pub mod session;

pub use envelope::{Envelope, Payload, SUCCESS_CODE, UNAUTHORIZED_CODE};
pub use error::{ApiError, ErrorKind, Result};
pub use policy::AuthFailPolicy;
pub use session::{MemorySessionStore, Session, SessionStore};
