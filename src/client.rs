//! Core API client, credential provider seam, and error types.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::http::{add_extra_headers, build_http_client};
use crate::model::ApiResponse;
use crate::options::{ClientOptions, SecretString};

/// Errors that can occur during client operations.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Non-success HTTP status at connect time.
    #[error("server returned {status} {status_text}")]
    Transport { status: u16, status_text: String },

    /// The streaming endpoint answered with a buffered body instead of an
    /// event stream.
    #[error("response has no readable event stream")]
    StreamUnavailable,

    /// Business-level failure reported inside a success envelope.
    #[error("API error {code}: {message}")]
    Api { code: String, message: String },

    #[error("stream cancelled")]
    StreamCancelled,

    /// Envelope reported success but carried no payload where one is
    /// required.
    #[error("response envelope carried no data")]
    MissingData,

    #[error("invalid request: {0}")]
    InvalidRequest(&'static str),
}

/// Credential provider consulted once per call for the current bearer token.
///
/// Injected into [`ApiClient`] instead of being read from process-wide
/// state, so tests and multi-account setups can swap it out.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Current bearer token, or `None` when unauthenticated.
    async fn bearer_token(&self) -> Option<SecretString>;
}

/// Authenticator holding a fixed token, or none at all.
pub struct StaticToken(Option<SecretString>);

impl StaticToken {
    /// Authenticate every request with the given token.
    pub fn new(token: impl Into<SecretString>) -> Self {
        Self(Some(token.into()))
    }

    /// Send requests without credentials; the backend decides whether to
    /// reject them.
    pub fn anonymous() -> Self {
        Self(None)
    }
}

#[async_trait]
impl Authenticator for StaticToken {
    async fn bearer_token(&self) -> Option<SecretString> {
        self.0.clone()
    }
}

/// Mutable token slot for login/logout flows: store the token returned by
/// `login`, clear it on `logout`, and share the store with the client.
#[derive(Default)]
pub struct TokenStore {
    token: RwLock<Option<SecretString>>,
}

impl TokenStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set(&self, token: impl Into<SecretString>) {
        *self.token.write().expect("token lock poisoned") = Some(token.into());
    }

    pub fn clear(&self) {
        *self.token.write().expect("token lock poisoned") = None;
    }

    pub fn get(&self) -> Option<SecretString> {
        self.token.read().expect("token lock poisoned").clone()
    }
}

#[async_trait]
impl Authenticator for TokenStore {
    async fn bearer_token(&self) -> Option<SecretString> {
        self.get()
    }
}

/// Authenticated client for the backend's REST and streaming endpoints.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use paperchat::client::{ApiClient, StaticToken};
/// use paperchat::options::ClientOptions;
///
/// # fn main() -> Result<(), paperchat::client::ClientError> {
/// let client = ApiClient::new(
///     ClientOptions::new("http://localhost:8069".to_string()),
///     Arc::new(StaticToken::new("my-token")),
/// )?;
/// # Ok(())
/// # }
/// ```
pub struct ApiClient {
    http: reqwest::Client,
    options: ClientOptions,
    auth: Arc<dyn Authenticator>,
}

impl ApiClient {
    /// Create a client from transport options and a credential provider.
    pub fn new(
        options: ClientOptions,
        auth: Arc<dyn Authenticator>,
    ) -> Result<Self, ClientError> {
        let http = build_http_client(&options)?;
        Ok(Self {
            http,
            options,
            auth,
        })
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub(crate) fn auth(&self) -> &Arc<dyn Authenticator> {
        &self.auth
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Start a request against an endpoint path, with content type, bearer
    /// token (when one is available) and configured extra headers attached.
    pub(crate) async fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut req = self
            .http
            .request(method, self.options.endpoint(path))
            .header(CONTENT_TYPE, "application/json");

        if let Some(token) = self.auth.bearer_token().await {
            req = req.header(
                AUTHORIZATION,
                format!("Bearer {}", token.expose_secret()),
            );
        }

        add_extra_headers(req, &self.options.extra_headers)
    }

    /// Send a request and decode the response envelope.
    ///
    /// HTTP-level failures map to [`ClientError::Transport`]; business-level
    /// failures stay inside the returned envelope until it is unwrapped.
    pub(crate) async fn send<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
    ) -> Result<ApiResponse<T>, ClientError> {
        let response = req.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Transport {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("").to_string(),
            });
        }
        Ok(response.json::<ApiResponse<T>>().await?)
    }
}
