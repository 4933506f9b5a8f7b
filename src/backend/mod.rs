//! Client for the storefront backend's credential check.
//!
//! The backend owns users and passwords; this side only asks it whether an
//! email/password pair is valid and which role the account has.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::config::BackendConfig;

/// Account details returned by a successful credential check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendUser {
    #[serde(default)]
    pub id: Option<Value>,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl BackendUser {
    /// Stable subject for the session token: the backend id, else the email.
    pub fn subject(&self) -> String {
        match &self.id {
            Some(Value::String(id)) => id.clone(),
            Some(Value::Null) | None => self.email.clone(),
            Some(other) => other.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("no account for this email")]
    EmailNotFound,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("backend answered {0}")]
    UnexpectedStatus(u16),

    #[error("backend request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid backend URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl BackendError {
    /// Value of the `error` query parameter on the login page.
    pub fn login_error_code(&self) -> &'static str {
        match self {
            BackendError::EmailNotFound => "email_not_found",
            BackendError::InvalidCredentials => "invalid_credentials",
            BackendError::UnexpectedStatus(_) | BackendError::Transport(_) | BackendError::InvalidUrl(_) => {
                "service_unavailable"
            }
        }
    }

    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::NOT_FOUND => BackendError::EmailNotFound,
            StatusCode::UNAUTHORIZED | StatusCode::BAD_REQUEST | StatusCode::FORBIDDEN => {
                BackendError::InvalidCredentials
            }
            other => BackendError::UnexpectedStatus(other.as_u16()),
        }
    }
}

/// Verifies email/password pairs. Implemented by [`BackendClient`]; tests swap
/// in their own.
#[async_trait]
pub trait CredentialsProvider: Send + Sync {
    async fn authorize(&self, email: &str, password: &str) -> Result<BackendUser, BackendError>;
}

#[derive(Debug, Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

/// Backend answers either `{ "data": user }` or the bare user object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LoginResponse {
    Wrapped { data: BackendUser },
    Bare(BackendUser),
}

impl From<LoginResponse> for BackendUser {
    fn from(response: LoginResponse) -> Self {
        match response {
            LoginResponse::Wrapped { data } => data,
            LoginResponse::Bare(user) => user,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BackendClient {
    base_url: Url,
    http: reqwest::Client,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let base_url = Url::parse(base_url)?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { base_url, http })
    }

    pub fn from_config(backend: &BackendConfig) -> Result<Self, BackendError> {
        Self::new(&backend.base_url, Duration::from_secs(backend.timeout_secs))
    }

    pub fn login_url(&self) -> Result<Url, BackendError> {
        Ok(self.base_url.join("/api/auth/login")?)
    }
}

#[async_trait]
impl CredentialsProvider for BackendClient {
    async fn authorize(&self, email: &str, password: &str) -> Result<BackendUser, BackendError> {
        let url = self.login_url()?;
        tracing::debug!("Checking credentials against {}", url);

        let response = self
            .http
            .post(url)
            .json(&LoginBody { email, password })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::from_status(status));
        }

        let body: LoginResponse = response.json().await?;
        Ok(body.into())
    }
}
