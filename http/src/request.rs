//! Per-call request configuration.

use activity_console_core::AuthFailPolicy;
use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde_json::Value;

/// A part of a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPart {
    /// A plain text field.
    Text {
        /// Field name
        name: String,
        /// Field value
        value: String,
    },
    /// A file upload.
    File {
        /// Field name
        name: String,
        /// File name reported to the server
        file_name: String,
        /// MIME type of the file, if known
        mime: Option<String>,
        /// File contents
        bytes: Vec<u8>,
    },
}

/// Multipart form body, e.g. an activity poster upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    parts: Vec<FormPart>,
}

impl MultipartForm {
    /// Create an empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a text field.
    #[must_use]
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart::Text {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Add a file field.
    #[must_use]
    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        mime: Option<&str>,
        bytes: Vec<u8>,
    ) -> Self {
        self.parts.push(FormPart::File {
            name: name.into(),
            file_name: file_name.into(),
            mime: mime.map(str::to_string),
            bytes,
        });
        self
    }

    /// The parts in insertion order.
    #[must_use]
    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    /// Convert into the transport's form type.
    ///
    /// A MIME type that does not parse is dropped and the transport default
    /// (`application/octet-stream`) applies.
    pub(crate) fn into_form(self) -> Form {
        self.parts.into_iter().fold(Form::new(), |form, part| match part {
            FormPart::Text { name, value } => form.text(name, value),
            FormPart::File {
                name,
                file_name,
                mime,
                bytes,
            } => {
                let part = Part::bytes(bytes).file_name(file_name);
                let part = match mime.as_deref().and_then(part_headers) {
                    Some(headers) => part.headers(headers),
                    None => part,
                };
                form.part(name, part)
            }
        })
    }
}

/// Content-type header for a file part, or `None` if `mime` is not a valid
/// MIME type.
fn part_headers(mime: &str) -> Option<HeaderMap> {
    Part::text("").mime_str(mime).ok()?;
    let value = HeaderValue::from_str(mime).ok()?;
    Some([(CONTENT_TYPE, value)].into_iter().collect())
}

/// Request body.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Body {
    /// No body.
    #[default]
    Empty,
    /// Structured body encoded as JSON.
    Json(Value),
    /// Multipart form; the transport picks the boundary.
    Multipart(MultipartForm),
    /// Raw bytes with an optional content type.
    Binary {
        /// The payload
        bytes: Vec<u8>,
        /// Content type sent with the payload
        content_type: Option<String>,
    },
}

impl Body {
    /// Whether the transport must negotiate its own content type.
    #[must_use]
    pub const fn is_binary(&self) -> bool {
        matches!(self, Self::Multipart(_) | Self::Binary { .. })
    }
}

/// Configuration of a single call.
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Body,
    pub(crate) auth_fail: AuthFailPolicy,
}

impl RequestConfig {
    /// A request with the given method and path.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: Body::Empty,
            auth_fail: AuthFailPolicy::None,
        }
    }

    /// `GET path`
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// `POST path`
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// `PUT path`
    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    /// `PATCH path`
    #[must_use]
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    /// `DELETE path`
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append a query parameter.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Set a header, replacing an earlier value with the same name.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
        self
    }

    /// Use a JSON body.
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Body::Json(body);
        self
    }

    /// Use a JSON body serialized from `body`.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if `body` cannot be represented as JSON.
    pub fn json_from<T: Serialize>(self, body: &T) -> Result<Self, serde_json::Error> {
        Ok(self.json(serde_json::to_value(body)?))
    }

    /// Use a multipart body.
    #[must_use]
    pub fn multipart(mut self, form: MultipartForm) -> Self {
        self.body = Body::Multipart(form);
        self
    }

    /// Use a raw byte body.
    #[must_use]
    pub fn binary(mut self, bytes: Vec<u8>, content_type: Option<&str>) -> Self {
        self.body = Body::Binary {
            bytes,
            content_type: content_type.map(str::to_string),
        };
        self
    }

    /// Set the soft-unauthorized policy.
    #[must_use]
    pub const fn auth_fail(mut self, policy: AuthFailPolicy) -> Self {
        self.auth_fail = policy;
        self
    }

    /// The HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// The request path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The body.
    #[must_use]
    pub const fn body(&self) -> &Body {
        &self.body
    }

    /// The soft-unauthorized policy.
    #[must_use]
    pub const fn auth_fail_policy(&self) -> AuthFailPolicy {
        self.auth_fail
    }

    /// Whether the caller set header `name`, compared case-insensitively.
    #[must_use]
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.iter().any(|(n, _)| n.eq_ignore_ascii_case(name))
    }

    /// Caller headers after content-type negotiation.
    ///
    /// JSON bodies get `application/json` unless the caller set a content
    /// type. Multipart and binary bodies drop any caller content type.
    #[must_use]
    pub fn effective_headers(&self) -> Vec<(String, String)> {
        let is_content_type = |name: &str| name.eq_ignore_ascii_case("content-type");
        let mut headers = self.headers.clone();
        match &self.body {
            Body::Json(_) => {
                if !headers.iter().any(|(n, _)| is_content_type(n)) {
                    headers.push(("Content-Type".to_string(), "application/json".to_string()));
                }
            }
            Body::Multipart(_) | Body::Binary { .. } => {
                headers.retain(|(n, _)| !is_content_type(n));
            }
            Body::Empty => {}
        }
        headers
    }
}
