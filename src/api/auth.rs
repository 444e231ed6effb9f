//! Authentication endpoints.

use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::client::{ApiClient, ClientError};

/// Login credentials. Captcha fields are only required when the backend
/// has captcha verification enabled.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captcha: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captcha_key: Option<String>,
}

impl LoginRequest {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            captcha: None,
            captcha_key: None,
        }
    }

    pub fn with_captcha(mut self, captcha: String, captcha_key: String) -> Self {
        self.captcha = Some(captcha);
        self.captcha_key = Some(captcha_key);
        self
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captcha: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captcha_key: Option<String>,
}

/// Profile of the authenticated user.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub user_id: i64,
    pub username: String,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub last_login_time: Option<String>,
}

/// Successful login payload: the bearer token plus its metadata and the
/// user's profile. Feed `token` into a
/// [`TokenStore`](crate::client::TokenStore) to authenticate later calls.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginSession {
    pub token: String,
    #[serde(default)]
    pub token_name: Option<String>,
    #[serde(default)]
    pub token_prefix: Option<String>,
    /// Token lifetime in seconds.
    #[serde(default)]
    pub token_timeout: Option<i64>,
    pub user_info: UserInfo,
}

/// A captcha challenge: opaque key plus a base64-encoded image.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Captcha {
    pub captcha_key: String,
    pub captcha_image: String,
}

impl ApiClient {
    /// `GET /auth/captcha` — fetch a captcha challenge for login/register.
    pub async fn captcha(&self) -> Result<Captcha, ClientError> {
        let req = self.request(Method::GET, "/auth/captcha").await;
        self.send::<Captcha>(req).await?.into_data()
    }

    /// `POST /auth/login` — exchange credentials for a session token.
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginSession, ClientError> {
        let req = self.request(Method::POST, "/auth/login").await.json(request);
        self.send::<LoginSession>(req).await?.into_data()
    }

    /// `POST /auth/register` — create an account.
    pub async fn register(&self, request: &RegisterRequest) -> Result<(), ClientError> {
        let req = self
            .request(Method::POST, "/auth/register")
            .await
            .json(request);
        let _ = self.send::<serde_json::Value>(req).await?.into_result()?;
        Ok(())
    }

    /// `POST /auth/logout` — invalidate the current session server-side.
    /// The caller clears its own token store.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let req = self.request(Method::POST, "/auth/logout").await;
        let _ = self.send::<serde_json::Value>(req).await?.into_result()?;
        Ok(())
    }

    /// `GET /auth/check` — whether the current token is still valid.
    pub async fn check_auth(&self) -> Result<bool, ClientError> {
        let req = self.request(Method::GET, "/auth/check").await;
        self.send::<bool>(req).await?.into_data()
    }

    /// `GET /auth/current-user-id` — id of the authenticated user.
    pub async fn current_user_id(&self) -> Result<i64, ClientError> {
        let req = self.request(Method::GET, "/auth/current-user-id").await;
        self.send::<i64>(req).await?.into_data()
    }
}
