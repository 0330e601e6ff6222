//! Client configuration.
//!
//! Values come from the embedding application or from the environment:
//!
//! | Variable | Meaning | Default |
//! |----------|---------|---------|
//! | `CONSOLE_API_BASE_URL` | Backend base URL | required |
//! | `CONSOLE_API_TIMEOUT_MS` | Per-request timeout | `15000` |
//! | `CONSOLE_TOKEN_HEADER` | Header carrying the token | `Authorization` |

use std::time::Duration;
use thiserror::Error;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Default header carrying the credential token.
pub const DEFAULT_TOKEN_HEADER: &str = "Authorization";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Missing `CONSOLE_API_BASE_URL` environment variable
    #[error("Missing CONSOLE_API_BASE_URL environment variable")]
    MissingBaseUrl,

    /// Base URL is not http(s)
    #[error("Base URL must start with http:// or https://: {0}")]
    InvalidBaseUrl(String),

    /// Timeout could not be parsed
    #[error("Invalid CONSOLE_API_TIMEOUT_MS value: {0}")]
    InvalidTimeout(String),

    /// Token header name is not a valid header name
    #[error("Invalid token header name: {0}")]
    InvalidTokenHeader(String),

    /// The transport could not be built
    #[error("Failed to build HTTP transport: {0}")]
    Transport(String),
}

/// [`HttpClient`](crate::HttpClient) configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL; request paths are appended to it.
    pub base_url: String,

    /// Fixed client-side timeout applied to every request.
    ///
    /// Default: 15 seconds
    pub timeout: Duration,

    /// Header name the token is attached under, value sent verbatim.
    ///
    /// Default: `Authorization`
    pub token_header: String,
}

impl ClientConfig {
    /// Create a configuration for `base_url` with default settings.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
            token_header: DEFAULT_TOKEN_HEADER.to_string(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingBaseUrl` if `CONSOLE_API_BASE_URL` is not
    /// set, `ConfigError::InvalidTimeout` if the timeout is not an integer, and
    /// validation errors from [`ClientConfig::validate`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url =
            std::env::var("CONSOLE_API_BASE_URL").map_err(|_| ConfigError::MissingBaseUrl)?;
        let mut config = Self::new(base_url);

        if let Ok(raw) = std::env::var("CONSOLE_API_TIMEOUT_MS") {
            let millis = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidTimeout(raw.clone()))?;
            config = config.with_timeout(Duration::from_millis(millis));
        }

        if let Ok(header) = std::env::var("CONSOLE_TOKEN_HEADER") {
            config = config.with_token_header(header);
        }

        config.validate()?;
        Ok(config)
    }

    /// Set the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the header the token is attached under.
    #[must_use]
    pub fn with_token_header(mut self, header: impl Into<String>) -> Self {
        self.token_header = header.into();
        self
    }

    /// Check the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not http(s), the timeout is zero,
    /// or the token header is not a valid header name.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigError::InvalidBaseUrl(self.base_url.clone()));
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout("0".to_string()));
        }
        if reqwest::header::HeaderName::from_bytes(self.token_header.as_bytes()).is_err() {
            return Err(ConfigError::InvalidTokenHeader(self.token_header.clone()));
        }
        Ok(())
    }

    /// Join the base URL and a request path with exactly one slash.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::new("http://localhost:8080/api");
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert_eq!(config.token_header, "Authorization");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_url_join() {
        let config = ClientConfig::new("http://localhost:8080/api/");
        assert_eq!(
            config.url_for("/activity/list"),
            "http://localhost:8080/api/activity/list"
        );
        assert_eq!(
            config.url_for("activity/list"),
            "http://localhost:8080/api/activity/list"
        );
        assert_eq!(
            config.url_for("https://cdn.example.edu/a.png"),
            "https://cdn.example.edu/a.png"
        );
    }

    #[test]
    fn test_validation_failures() {
        assert!(matches!(
            ClientConfig::new("ftp://x").validate(),
            Err(ConfigError::InvalidBaseUrl(_))
        ));
        assert!(matches!(
            ClientConfig::new("http://x")
                .with_timeout(Duration::ZERO)
                .validate(),
            Err(ConfigError::InvalidTimeout(_))
        ));
        assert!(matches!(
            ClientConfig::new("http://x")
                .with_token_header("bad header")
                .validate(),
            Err(ConfigError::InvalidTokenHeader(_))
        ));
    }
}
