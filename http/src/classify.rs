//! Outcome classification.
//!
//! Maps what the transport observed onto the error taxonomy. This is the only
//! place a classification is assigned. Rules apply in order, first match wins:
//!
//! 1. timeout → `TIMEOUT`
//! 2. no response → `NETWORK`
//! 3. 401 → `UNAUTHORIZED` with teardown
//! 4. 403 → `FORBIDDEN`
//! 5. other 4xx → `BAD_REQUEST`
//! 6. 5xx → `SERVER_ERROR`
//! 7. 2xx envelope with a non-success code → `BUSINESS_ERROR`, or
//!    `UNAUTHORIZED` with teardown when the code is 401 under
//!    [`AuthFailPolicy::Logout`]
//! 8. anything else → `UNKNOWN`

use activity_console_core::envelope::extract_message;
use activity_console_core::{ApiError, AuthFailPolicy, Payload};
use serde_json::Value;

/// What the transport observed for one request.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The client-side timeout elapsed.
    Timeout,
    /// No response was obtained.
    NoResponse,
    /// The request could not be sent for a reason other than connectivity.
    Aborted(String),
    /// A response arrived; `body` is the decoded payload.
    Response {
        /// Transport status
        status: u16,
        /// Decoded body (`null` when empty)
        body: Value,
    },
}

/// A classified failure and whether it ends the session.
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    /// The classified error.
    pub error: ApiError,
    /// Whether the session must be torn down.
    pub teardown: bool,
}

impl Failure {
    const fn keep(error: ApiError) -> Self {
        Self {
            error,
            teardown: false,
        }
    }

    const fn logout(error: ApiError) -> Self {
        Self {
            error,
            teardown: true,
        }
    }
}

/// Classify an outcome under the request's auth policy.
///
/// # Errors
///
/// Returns the [`Failure`] for every outcome other than a 2xx response whose
/// body is either raw or a successful envelope.
pub fn classify(outcome: Outcome, policy: AuthFailPolicy) -> Result<Value, Failure> {
    let (status, body) = match outcome {
        Outcome::Timeout => return Err(Failure::keep(ApiError::timeout())),
        Outcome::NoResponse => return Err(Failure::keep(ApiError::network())),
        Outcome::Aborted(reason) => {
            tracing::debug!(%reason, "Request aborted before sending");
            return Err(Failure::keep(ApiError::unknown(None, None)));
        }
        Outcome::Response { status, body } => (status, body),
    };

    if status >= 400 {
        let message = extract_message(&body);
        let business_code = match Payload::detect(body) {
            Payload::Wrapped(envelope) if !envelope.is_success() => Some(envelope.code),
            _ => None,
        };
        return match ApiError::from_status(status, business_code, message.clone()) {
            Some(error) if error.is_unauthorized() => Err(Failure::logout(error)),
            Some(error) => Err(Failure::keep(error)),
            None => Err(Failure::keep(ApiError::unknown(Some(status), message))),
        };
    }

    if !(200..300).contains(&status) {
        return Err(Failure::keep(ApiError::unknown(
            Some(status),
            extract_message(&body),
        )));
    }

    match Payload::detect(body) {
        Payload::Raw(value) => Ok(value),
        Payload::Wrapped(envelope) if envelope.is_success() => Ok(envelope.data),
        Payload::Wrapped(envelope) if envelope.is_unauthorized() && policy.logs_out() => Err(
            Failure::logout(ApiError::soft_unauthorized(status, envelope.code, envelope.msg)),
        ),
        Payload::Wrapped(envelope) => Err(Failure::keep(ApiError::business(
            status,
            envelope.code,
            envelope.msg,
        ))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use activity_console_core::ErrorKind;
    use serde_json::json;

    fn response(status: u16, body: Value) -> Outcome {
        Outcome::Response { status, body }
    }

    fn fail(outcome: Outcome, policy: AuthFailPolicy) -> Failure {
        classify(outcome, policy).unwrap_err()
    }

    #[test]
    fn test_transport_failures() {
        let f = fail(Outcome::Timeout, AuthFailPolicy::None);
        assert_eq!(f.error.kind(), ErrorKind::Timeout);
        assert_eq!(f.error.transport_status(), None);
        assert!(!f.teardown);

        let f = fail(Outcome::NoResponse, AuthFailPolicy::Logout);
        assert_eq!(f.error.kind(), ErrorKind::Network);
        assert!(!f.teardown);

        let f = fail(
            Outcome::Aborted("invalid header value".to_string()),
            AuthFailPolicy::None,
        );
        assert_eq!(f.error.kind(), ErrorKind::Unknown);
        assert_eq!(f.error.message(), None);
    }

    #[test]
    fn test_status_priority_table() {
        let cases = [
            (400, ErrorKind::BadRequest, false),
            (401, ErrorKind::Unauthorized, true),
            (403, ErrorKind::Forbidden, false),
            (404, ErrorKind::BadRequest, false),
            (409, ErrorKind::BadRequest, false),
            (422, ErrorKind::BadRequest, false),
            (500, ErrorKind::ServerError, false),
            (502, ErrorKind::ServerError, false),
            (504, ErrorKind::ServerError, false),
        ];
        for policy in [AuthFailPolicy::None, AuthFailPolicy::Logout] {
            for (status, kind, teardown) in cases {
                let f = fail(response(status, Value::Null), policy);
                assert_eq!(f.error.kind(), kind, "status {status}");
                assert_eq!(f.error.transport_status(), Some(status));
                assert_eq!(f.teardown, teardown, "status {status}");
            }
        }
    }

    #[test]
    fn test_hard_401_tears_down_even_with_envelope() {
        let f = fail(
            response(401, json!({"code": 200, "msg": "ok", "data": null})),
            AuthFailPolicy::None,
        );
        assert_eq!(f.error.kind(), ErrorKind::Unauthorized);
        assert!(f.teardown);
    }

    #[test]
    fn test_error_status_keeps_backend_message() {
        let f = fail(
            response(500, json!({"code": 500, "msg": "internal error"})),
            AuthFailPolicy::None,
        );
        assert_eq!(f.error.kind(), ErrorKind::ServerError);
        assert_eq!(f.error.message(), Some("internal error"));
        assert_eq!(f.error.business_code(), None);

        let f = fail(
            response(403, json!({"code": 40300, "msg": "无权限", "data": null})),
            AuthFailPolicy::None,
        );
        assert_eq!(f.error.business_code(), Some(40300));
        assert_eq!(f.error.message(), Some("无权限"));
    }

    #[test]
    fn test_empty_backend_message_falls_through() {
        let f = fail(
            response(500, json!({"code": 500, "msg": ""})),
            AuthFailPolicy::None,
        );
        assert_eq!(f.error.kind(), ErrorKind::ServerError);
        assert_eq!(f.error.message(), None);
        assert_eq!(f.error.display_message(), ErrorKind::ServerError.default_message());

        let f = fail(
            response(500, json!({"msg": "", "message": "库存不足"})),
            AuthFailPolicy::None,
        );
        assert_eq!(f.error.message(), Some("库存不足"));
    }

    #[test]
    fn test_business_failure() {
        let f = fail(
            response(200, json!({"code": 4001, "msg": "报名人数已满", "data": null})),
            AuthFailPolicy::Logout,
        );
        assert_eq!(f.error.kind(), ErrorKind::BusinessError);
        assert_eq!(f.error.business_code(), Some(4001));
        assert_eq!(f.error.transport_status(), Some(200));
        assert_eq!(f.error.message(), Some("报名人数已满"));
        assert!(!f.teardown);
    }

    #[test]
    fn test_soft_unauthorized_is_policy_gated() {
        let body = json!({"code": 401, "msg": "token expired", "data": null});

        let f = fail(response(200, body.clone()), AuthFailPolicy::Logout);
        assert_eq!(f.error.kind(), ErrorKind::Unauthorized);
        assert_eq!(f.error.transport_status(), Some(200));
        assert_eq!(f.error.business_code(), Some(401));
        assert!(f.teardown);

        let f = fail(response(200, body), AuthFailPolicy::None);
        assert_eq!(f.error.kind(), ErrorKind::BusinessError);
        assert_eq!(f.error.business_code(), Some(401));
        assert!(!f.teardown);
    }

    #[test]
    fn test_success_unwraps_envelope_and_passes_raw() {
        let data = classify(
            response(200, json!({"code": 200, "msg": "ok", "data": {"total": 3}})),
            AuthFailPolicy::None,
        )
        .unwrap();
        assert_eq!(data, json!({"total": 3}));

        let raw = json!({"records": [], "total": 0});
        assert_eq!(
            classify(response(200, raw.clone()), AuthFailPolicy::None).unwrap(),
            raw
        );
        assert_eq!(
            classify(response(204, Value::Null), AuthFailPolicy::None).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn test_leftover_statuses_are_unknown() {
        let f = fail(response(304, Value::Null), AuthFailPolicy::None);
        assert_eq!(f.error.kind(), ErrorKind::Unknown);
        assert_eq!(f.error.transport_status(), Some(304));
    }
}
