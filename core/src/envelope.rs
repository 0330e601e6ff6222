//! Backend response envelope detection.
//!
//! Most endpoints wrap their payload as `{code, msg, data, timestamp}`, a few
//! return raw JSON. Detection is purely structural: any object with an integer
//! `code`, a string `msg` and a `data` key is wrapped, everything else is raw.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Envelope code for success.
pub const SUCCESS_CODE: i64 = 200;

/// Envelope code signalling an expired or missing session.
pub const UNAUTHORIZED_CODE: i64 = 401;

/// Fields checked, in order, for backend error text in a non-envelope body.
const MESSAGE_FIELDS: [&str; 3] = ["msg", "message", "error"];

/// The backend's response wrapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Business result code, [`SUCCESS_CODE`] on success.
    pub code: i64,
    /// Display text supplied by the backend.
    pub msg: String,
    /// The payload.
    pub data: Value,
    /// Server time in epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl Envelope {
    /// Wrap `data` as a successful envelope stamped with the current time.
    #[must_use]
    pub fn wrap(data: Value) -> Self {
        Self {
            code: SUCCESS_CODE,
            msg: "success".to_string(),
            data,
            timestamp: Some(Utc::now().timestamp_millis()),
        }
    }

    /// Build a failing envelope.
    #[must_use]
    pub fn failure(code: i64, msg: impl Into<String>) -> Self {
        Self {
            code,
            msg: msg.into(),
            data: Value::Null,
            timestamp: None,
        }
    }

    /// Whether the business code is [`SUCCESS_CODE`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }

    /// Whether the business code is [`UNAUTHORIZED_CODE`].
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        self.code == UNAUTHORIZED_CODE
    }

    /// Serialize back into the JSON shape the backend sends.
    #[must_use]
    pub fn into_value(self) -> Value {
        let mut map = serde_json::Map::new();
        map.insert("code".to_string(), Value::from(self.code));
        map.insert("msg".to_string(), Value::String(self.msg));
        map.insert("data".to_string(), self.data);
        if let Some(ts) = self.timestamp {
            map.insert("timestamp".to_string(), Value::from(ts));
        }
        Value::Object(map)
    }
}

/// Result of envelope detection on a decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// The body matched the envelope shape.
    Wrapped(Envelope),
    /// The body is returned to callers unmodified.
    Raw(Value),
}

impl Payload {
    /// Classify a decoded body.
    #[must_use]
    pub fn detect(value: Value) -> Self {
        let Value::Object(mut map) = value else {
            return Self::Raw(value);
        };

        let code = map.get("code").and_then(Value::as_i64);
        let has_msg = map.get("msg").is_some_and(Value::is_string);
        let (Some(code), true, true) = (code, has_msg, map.contains_key("data")) else {
            return Self::Raw(Value::Object(map));
        };

        let msg = match map.remove("msg") {
            Some(Value::String(msg)) => msg,
            _ => String::new(),
        };
        let data = map.remove("data").unwrap_or(Value::Null);
        let timestamp = map.get("timestamp").and_then(Value::as_i64);

        Self::Wrapped(Envelope {
            code,
            msg,
            data,
            timestamp,
        })
    }

    /// The payload callers see: `data` for envelopes, the body itself otherwise.
    #[must_use]
    pub fn into_data(self) -> Value {
        match self {
            Self::Wrapped(envelope) => envelope.data,
            Self::Raw(value) => value,
        }
    }
}

/// Strip one envelope layer if present.
#[must_use]
pub fn unwrap(value: Value) -> Value {
    Payload::detect(value).into_data()
}

/// First non-empty backend-supplied string among `msg`, `message` and `error`.
///
/// The text is returned unmodified.
#[must_use]
pub fn extract_message(body: &Value) -> Option<String> {
    let map = body.as_object()?;
    MESSAGE_FIELDS
        .iter()
        .find_map(|field| map.get(*field).and_then(Value::as_str).filter(|s| !s.is_empty()))
        .map(str::to_string)
}
