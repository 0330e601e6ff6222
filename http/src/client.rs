//! HTTP client implementation

use crate::{
    classify::{Failure, Outcome, classify},
    config::{ClientConfig, ConfigError},
    hooks::{HookError, Hooks},
    request::{Body, RequestConfig},
};
use activity_console_core::{ApiError, Session};
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

/// Backend client used by every domain API function.
///
/// Clones share the transport, the session and the registered hooks.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: Arc<ClientConfig>,
    session: Session,
    hooks: Arc<Hooks>,
}

impl HttpClient {
    /// Create a client with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the configuration is invalid or the
    /// transport cannot be built.
    pub fn new(config: ClientConfig, session: Session) -> Result<Self, ConfigError> {
        config.validate()?;
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ConfigError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            config: Arc::new(config),
            session,
            hooks: Arc::new(Hooks::new()),
        })
    }

    /// Create a client configured from the environment.
    ///
    /// # Errors
    ///
    /// See [`ClientConfig::from_env`] and [`HttpClient::new`].
    pub fn from_env(session: Session) -> Result<Self, ConfigError> {
        Self::new(ClientConfig::from_env()?, session)
    }

    /// The client configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The session the client reads credentials from.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// The registered hooks.
    #[must_use]
    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    /// Register the handler run after an unauthorized teardown.
    ///
    /// # Errors
    ///
    /// Returns `HookError::AlreadySet` on a second registration.
    pub fn set_on_unauthorized<F>(&self, handler: F) -> Result<(), HookError>
    where
        F: Fn(&ApiError) + Send + Sync + 'static,
    {
        self.hooks.set_on_unauthorized(handler)
    }

    /// Register the observer that sees every classified failure.
    ///
    /// # Errors
    ///
    /// Returns `HookError::AlreadySet` on a second registration.
    pub fn set_on_http_error<F>(&self, observer: F) -> Result<(), HookError>
    where
        F: Fn(&ApiError) + Send + Sync + 'static,
    {
        self.hooks.set_on_http_error(observer)
    }

    /// Send a request and return the unwrapped payload.
    ///
    /// # Errors
    ///
    /// Returns exactly one classified [`ApiError`] for any non-success
    /// outcome.
    pub async fn request(&self, config: RequestConfig) -> Result<Value, ApiError> {
        let policy = config.auth_fail_policy();
        let method = config.method().clone();
        let path = config.path().to_string();

        tracing::debug!(%method, path = %path, policy = %policy, "Sending request");
        metrics::counter!("http.request.sent").increment(1);

        // A caller-supplied token header wins over the session token.
        let token = self
            .session
            .token()
            .filter(|_| !config.has_header(&self.config.token_header));
        let token_attached = token.is_some();

        let outcome = self.send(config, token).await;
        classify(outcome, policy)
            .map_err(|failure| self.fail(&method, &path, failure, token_attached))
    }

    /// Send a request and deserialize the unwrapped payload.
    ///
    /// # Errors
    ///
    /// Returns the classified error from [`HttpClient::request`], or an
    /// `UNKNOWN` error if the payload does not match `T`.
    pub async fn request_as<T: DeserializeOwned>(
        &self,
        config: RequestConfig,
    ) -> Result<T, ApiError> {
        let path = config.path().to_string();
        let data = self.request(config).await?;
        serde_json::from_value(data).map_err(|e| {
            tracing::warn!(path = %path, error = %e, "Response payload did not match expected shape");
            let error = ApiError::unknown(None, None);
            self.hooks.http_error(&error);
            error
        })
    }

    async fn send(&self, config: RequestConfig, token: Option<String>) -> Outcome {
        let headers = config.effective_headers();
        let url = self.config.url_for(&config.path);

        let mut request = self.client.request(config.method, url);
        if !config.query.is_empty() {
            request = request.query(&config.query);
        }
        if let Some(token) = token {
            request = request.header(self.config.token_header.as_str(), token);
        }
        for (name, value) in headers {
            request = request.header(name, value);
        }

        request = match config.body {
            Body::Empty => request,
            Body::Json(value) => request.body(value.to_string()),
            Body::Multipart(form) => request.multipart(form.into_form()),
            Body::Binary {
                bytes,
                content_type,
            } => {
                let request = request.body(bytes);
                match content_type {
                    Some(content_type) => request.header(CONTENT_TYPE, content_type),
                    None => request,
                }
            }
        };

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return transport_outcome(&e),
        };

        let status = response.status().as_u16();
        match response.bytes().await {
            Ok(bytes) => Outcome::Response {
                status,
                body: decode_body(&bytes),
            },
            Err(e) if e.is_timeout() => Outcome::Timeout,
            Err(e) => Outcome::Aborted(format!("failed to read response body: {e}")),
        }
    }

    /// The unauthorized handler runs once per teardown of a live session, and
    /// for every hard unauthorized failure of a request sent without a token.
    fn fail(
        &self,
        method: &reqwest::Method,
        path: &str,
        failure: Failure,
        token_attached: bool,
    ) -> ApiError {
        let Failure { error, teardown } = failure;

        if teardown {
            let cleared = self.session.teardown();
            if cleared || !token_attached {
                self.hooks.unauthorized(&error);
            }
        }

        metrics::counter!("http.request.failed", "kind" => error.kind().as_str()).increment(1);
        tracing::warn!(
            %method,
            path,
            kind = %error.kind(),
            status = ?error.transport_status(),
            business_code = ?error.business_code(),
            "Request failed"
        );

        self.hooks.http_error(&error);
        error
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("session", &self.session)
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}

fn transport_outcome(error: &reqwest::Error) -> Outcome {
    if error.is_timeout() {
        Outcome::Timeout
    } else if error.is_builder() {
        Outcome::Aborted(error.to_string())
    } else {
        Outcome::NoResponse
    }
}

/// Empty bodies decode to `null`, non-JSON bodies to a JSON string.
fn decode_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_creation() {
        let client =
            HttpClient::new(ClientConfig::new("http://localhost:8080/api"), Session::in_memory());
        assert!(client.is_ok());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let client = HttpClient::new(ClientConfig::new("localhost"), Session::in_memory());
        assert!(matches!(client, Err(ConfigError::InvalidBaseUrl(_))));
    }

    #[test]
    fn test_decode_body() {
        assert_eq!(decode_body(b""), Value::Null);
        assert_eq!(decode_body(b"  \n"), Value::Null);
        assert_eq!(decode_body(br#"{"a":1}"#), json!({"a": 1}));
        assert_eq!(decode_body(b"<html>502</html>"), json!("<html>502</html>"));
    }
}
