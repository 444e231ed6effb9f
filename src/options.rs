//! Client configuration options.

use std::collections::HashMap;
use std::time::Duration;

/// A secret string type for sensitive data like bearer tokens.
/// Prevents accidental logging or display of secrets.
#[derive(Clone)]
pub struct SecretString(String);

impl SecretString {
    /// Create a new secret string.
    pub fn new(s: String) -> Self {
        Self(s)
    }

    /// Get the underlying secret value.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretString([REDACTED])")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s.to_string())
    }
}

/// Transport configuration for [`ApiClient`](crate::client::ApiClient).
///
/// # Example
/// ```rust
/// use paperchat::options::ClientOptions;
/// use std::time::Duration;
///
/// let options = ClientOptions::new("http://localhost:8069".to_string())
///     .with_timeout(Duration::from_secs(300));
/// ```
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Base URL for all API endpoints, without a trailing slash.
    pub base_url: String,

    /// Request timeout, covering the whole call including body read.
    /// Leave unset for streaming-heavy use; the decode loop itself never
    /// imposes one.
    pub timeout: Option<Duration>,

    /// HTTP proxy URL.
    pub proxy: Option<String>,

    /// Additional HTTP headers to include in every request.
    pub extra_headers: Option<HashMap<String, String>>,
}

impl ClientOptions {
    /// Create options pointing at the given base URL.
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            timeout: None,
            proxy: None,
            extra_headers: None,
        }
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the proxy URL.
    pub fn with_proxy(mut self, proxy: String) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Set extra headers.
    pub fn with_extra_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.extra_headers = Some(headers);
        self
    }

    /// Add a single extra header.
    pub fn with_header(mut self, key: String, value: String) -> Self {
        self.extra_headers
            .get_or_insert_with(HashMap::new)
            .insert(key, value);
        self
    }

    /// Join an endpoint path onto the base URL.
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_string_redacts_debug() {
        let secret = SecretString::from("tok-123");
        assert_eq!(format!("{:?}", secret), "SecretString([REDACTED])");
        assert_eq!(secret.expose_secret(), "tok-123");
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let options = ClientOptions::new("http://host:8069/".to_string());
        assert_eq!(options.endpoint("/ai/chat"), "http://host:8069/ai/chat");

        let options = ClientOptions::new("http://host:8069".to_string());
        assert_eq!(options.endpoint("/ai/chat"), "http://host:8069/ai/chat");
    }
}
