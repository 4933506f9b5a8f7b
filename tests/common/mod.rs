#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use hiimart_store::{
    app::{self, AppState, CookieSettings},
    auth::TokenSigner,
    backend::{BackendError, BackendUser, CredentialsProvider},
    gate::{RouteGate, RouteTable},
};
use serde_json::Value;
use tower::ServiceExt;

pub const SECRET: &str = "integration-test-secret";
pub const COOKIE: &str = "hiimart.session-token";
pub const PASSWORD: &str = "correct-horse";

/// In-memory stand-in for the backend's credential check.
pub struct FakeCredentials {
    users: HashMap<String, Option<String>>,
}

impl FakeCredentials {
    pub fn new() -> Self {
        let mut users = HashMap::new();
        users.insert("shopper@hiimart.test".to_string(), Some("USER".to_string()));
        users.insert("admin@hiimart.test".to_string(), Some("ADMIN".to_string()));
        users.insert("super@hiimart.test".to_string(), Some("SUPER".to_string()));
        users.insert("vendor@hiimart.test".to_string(), Some("VENDOR".to_string()));
        Self { users }
    }
}

#[async_trait]
impl CredentialsProvider for FakeCredentials {
    async fn authorize(&self, email: &str, password: &str) -> Result<BackendUser, BackendError> {
        let role = self.users.get(email).ok_or(BackendError::EmailNotFound)?;
        if password != PASSWORD {
            return Err(BackendError::InvalidCredentials);
        }
        Ok(BackendUser {
            id: Some(Value::from(7)),
            email: email.to_string(),
            name: None,
            role: role.clone(),
        })
    }
}

pub fn signer() -> TokenSigner {
    TokenSigner::new(SECRET, 1)
}

pub fn state_with(credentials: Arc<dyn CredentialsProvider>) -> AppState {
    let gate = RouteGate::new(RouteTable::default()).expect("default route tables are valid");
    AppState::new(
        gate,
        signer(),
        credentials,
        CookieSettings {
            name: COOKIE.to_string(),
            secure: false,
        },
    )
}

pub fn test_app() -> Router {
    app::router(state_with(Arc::new(FakeCredentials::new())))
}

/// Signed session token carrying `role` (None = no role claim).
pub fn token_for(role: Option<&str>) -> String {
    let signer = signer();
    let claims = signer.claims_for(
        "7".to_string(),
        "someone@hiimart.test".to_string(),
        None,
        role.map(str::to_string),
    )
    .expect("one hour lifetime is in range");
    signer.sign(&claims).expect("test secret signs")
}

pub fn get(path: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(path);
    if let Some(token) = token {
        builder = builder.header(header::COOKIE, format!("{}={}", COOKIE, token));
    }
    builder.body(Body::empty()).expect("valid request")
}

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.expect("router is infallible")
}

pub fn location(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

pub fn set_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Token value from a `Set-Cookie` header written by the login endpoint.
pub fn token_from_set_cookie(set_cookie: &str) -> Option<String> {
    let (pair, _) = set_cookie.split_once(';')?;
    let (name, value) = pair.split_once('=')?;
    (name == COOKIE && !value.is_empty()).then(|| value.to_string())
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body reads");
    serde_json::from_slice(&bytes).expect("body is JSON")
}
