//! Error taxonomy for every failed backend call.
//!
//! Each failure path, transport-level or business-level, produces exactly one
//! [`ApiError`]. Consumers match on [`ApiError::kind`] instead of inspecting
//! status codes.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type alias for request-core operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Closed classification of a failed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// No transport response was obtained (connection refused, DNS, offline).
    Network,
    /// The client-side timeout elapsed.
    Timeout,
    /// Hard 401, or a soft envelope 401 under the logout policy.
    Unauthorized,
    /// Status 403.
    Forbidden,
    /// Status 404 or any other unmatched 4xx.
    BadRequest,
    /// Status 500 and above.
    ServerError,
    /// Successful transport carrying an envelope with a non-success code.
    BusinessError,
    /// Anything not covered above.
    Unknown,
}

impl ErrorKind {
    /// Every classification, in priority-table order.
    pub const ALL: [Self; 8] = [
        Self::Timeout,
        Self::Network,
        Self::Unauthorized,
        Self::Forbidden,
        Self::BadRequest,
        Self::ServerError,
        Self::BusinessError,
        Self::Unknown,
    ];

    /// Classify a transport status code.
    ///
    /// Returns `None` for statuses that are not failures by themselves
    /// (1xx, 2xx, 3xx). Those are resolved by envelope inspection or fall
    /// through to [`ErrorKind::Unknown`] at the call site.
    #[must_use]
    pub const fn from_status(status: u16) -> Option<Self> {
        match status {
            401 => Some(Self::Unauthorized),
            403 => Some(Self::Forbidden),
            400..=499 => Some(Self::BadRequest),
            500.. => Some(Self::ServerError),
            _ => None,
        }
    }

    /// Stable wire name, e.g. `"SERVER_ERROR"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Network => "NETWORK",
            Self::Timeout => "TIMEOUT",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::BadRequest => "BAD_REQUEST",
            Self::ServerError => "SERVER_ERROR",
            Self::BusinessError => "BUSINESS_ERROR",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Generic display text, used only when the backend supplied none.
    #[must_use]
    pub const fn default_message(self) -> &'static str {
        match self {
            Self::Network => "Network unavailable, please check your connection",
            Self::Timeout => "Request timed out, please try again",
            Self::Unauthorized => "Session expired, please sign in again",
            Self::Forbidden => "You do not have permission to perform this action",
            Self::BadRequest => "The request could not be processed",
            Self::ServerError => "Server error, please try again later",
            Self::BusinessError => "Operation failed",
            Self::Unknown => "Unexpected error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified request failure.
///
/// The classification is fixed at construction: there are no setters, so a
/// value observed downstream always carries the kind the HTTP layer assigned.
/// `message` holds backend text verbatim when the backend supplied any.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {}", message.as_deref().unwrap_or_else(|| kind.default_message()))]
pub struct ApiError {
    kind: ErrorKind,
    transport_status: Option<u16>,
    business_code: Option<i64>,
    message: Option<String>,
}

impl ApiError {
    /// Transport timeout.
    #[must_use]
    pub const fn timeout() -> Self {
        Self::bare(ErrorKind::Timeout)
    }

    /// No transport response at all.
    #[must_use]
    pub const fn network() -> Self {
        Self::bare(ErrorKind::Network)
    }

    /// A transport response with a failing status.
    ///
    /// Returns `None` when the status does not classify on its own
    /// (see [`ErrorKind::from_status`]).
    #[must_use]
    pub fn from_status(
        status: u16,
        business_code: Option<i64>,
        message: Option<String>,
    ) -> Option<Self> {
        ErrorKind::from_status(status).map(|kind| Self {
            kind,
            transport_status: Some(status),
            business_code,
            message,
        })
    }

    /// Envelope with a non-success business code on a successful transport.
    ///
    /// An empty backend message is treated as absent.
    #[must_use]
    pub fn business(status: u16, code: i64, message: String) -> Self {
        Self {
            kind: ErrorKind::BusinessError,
            transport_status: Some(status),
            business_code: Some(code),
            message: Some(message).filter(|m| !m.is_empty()),
        }
    }

    /// Envelope signalling "unauthorized" under the logout policy.
    #[must_use]
    pub fn soft_unauthorized(status: u16, code: i64, message: String) -> Self {
        Self {
            kind: ErrorKind::Unauthorized,
            transport_status: Some(status),
            business_code: Some(code),
            message: Some(message).filter(|m| !m.is_empty()),
        }
    }

    /// Fallback classification.
    #[must_use]
    pub const fn unknown(transport_status: Option<u16>, message: Option<String>) -> Self {
        Self {
            kind: ErrorKind::Unknown,
            transport_status,
            business_code: None,
            message,
        }
    }

    const fn bare(kind: ErrorKind) -> Self {
        Self {
            kind,
            transport_status: None,
            business_code: None,
            message: None,
        }
    }

    /// The classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Protocol status, present only when a response was received.
    #[must_use]
    pub const fn transport_status(&self) -> Option<u16> {
        self.transport_status
    }

    /// Envelope code, present only for recognized non-success envelopes.
    #[must_use]
    pub const fn business_code(&self) -> Option<i64> {
        self.business_code
    }

    /// Backend-supplied text, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Backend text, or the kind's generic text when there is none.
    #[must_use]
    pub fn display_message(&self) -> &str {
        self.message().unwrap_or_else(|| self.kind.default_message())
    }

    /// Whether this error is [`ErrorKind::Unauthorized`].
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.kind == ErrorKind::Unauthorized
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_table() {
        assert_eq!(ErrorKind::from_status(401), Some(ErrorKind::Unauthorized));
        assert_eq!(ErrorKind::from_status(403), Some(ErrorKind::Forbidden));
        assert_eq!(ErrorKind::from_status(404), Some(ErrorKind::BadRequest));
        assert_eq!(ErrorKind::from_status(400), Some(ErrorKind::BadRequest));
        assert_eq!(ErrorKind::from_status(429), Some(ErrorKind::BadRequest));
        assert_eq!(ErrorKind::from_status(500), Some(ErrorKind::ServerError));
        assert_eq!(ErrorKind::from_status(503), Some(ErrorKind::ServerError));
        assert_eq!(ErrorKind::from_status(200), None);
        assert_eq!(ErrorKind::from_status(304), None);
        assert_eq!(ErrorKind::from_status(101), None);
    }

    #[test]
    fn test_backend_message_is_kept_verbatim() {
        let err = ApiError::from_status(500, None, Some("  internal error ".to_string()))
            .unwrap();
        assert_eq!(err.message(), Some("  internal error "));
        assert_eq!(err.display_message(), "  internal error ");
    }

    #[test]
    fn test_fallback_message_only_for_display() {
        let err = ApiError::timeout();
        assert_eq!(err.message(), None);
        assert_eq!(err.display_message(), ErrorKind::Timeout.default_message());
        assert_eq!(err.transport_status(), None);
    }

    #[test]
    fn test_display_includes_kind() {
        let err = ApiError::business(200, 40001, "活动名称已存在".to_string());
        assert_eq!(err.to_string(), "BUSINESS_ERROR: 活动名称已存在");
        assert_eq!(err.business_code(), Some(40001));
    }

    #[test]
    fn test_kind_serializes_as_wire_name() {
        for kind in ErrorKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }
}
