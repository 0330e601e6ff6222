//! # Activity Console HTTP Client
//!
//! The single request entry point for the activity console backend.
//!
//! Every call goes through [`HttpClient::request`], which:
//!
//! - attaches the session token when one is stored
//! - encodes the body as JSON, multipart or raw bytes
//! - unwraps the backend's `{code, msg, data}` envelope
//! - classifies every failure into one [`ApiError`](activity_console_core::ApiError)
//! - tears the session down on unauthorized outcomes and notifies the
//!   registered [`Hooks`]
//!
//! ## Example
//!
//! ```no_run
//! use activity_console_core::{AuthFailPolicy, Session};
//! use activity_console_http::{ClientConfig, HttpClient, RequestConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new(
//!     ClientConfig::new("https://console.example.edu/api"),
//!     Session::in_memory(),
//! )?;
//!
//! client.set_on_unauthorized(|err| {
//!     eprintln!("redirecting to login: {}", err.display_message());
//! })?;
//!
//! let activities = client
//!     .request(
//!         RequestConfig::get("/activity/page")
//!             .query("pageNum", 1)
//!             .auth_fail(AuthFailPolicy::Logout),
//!     )
//!     .await?;
//! println!("{activities}");
//! # Ok(())
//! # }
//! ```

pub mod classify;
pub mod client;
pub mod config;
pub mod hooks;
pub mod request;

pub use client::HttpClient;
pub use config::{ClientConfig, ConfigError};
pub use hooks::{ErrorObserver, HookError, Hooks, UnauthorizedHandler};
pub use request::{Body, FormPart, MultipartForm, RequestConfig};
pub use reqwest::Method;
