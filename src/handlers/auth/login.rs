use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use super::{attach_cookie, session_cookie};
use crate::app::AppState;
use crate::auth::{Session, SessionAuth};
use crate::backend::BackendError;
use crate::error::ApiError;
use crate::gate::Principal;
use crate::middleware::{redirect_found, ApiResponse};

pub const LOGIN_PAGE: &str = "/login";

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(default, rename = "callbackUrl")]
    pub callback_url: Option<String>,
}

impl LoginRequest {
    fn from_form(body: &[u8]) -> Result<Self, ApiError> {
        let mut email = None;
        let mut password = None;
        let mut callback_url = None;

        for (key, value) in form_urlencoded::parse(body) {
            match key.as_ref() {
                "email" => email = Some(value.into_owned()),
                "password" => password = Some(value.into_owned()),
                "callbackUrl" => callback_url = Some(value.into_owned()),
                _ => {}
            }
        }

        match (email, password) {
            (Some(email), Some(password)) => Ok(Self {
                email,
                password,
                callback_url,
            }),
            _ => Err(ApiError::bad_request("email and password are required")),
        }
    }

    fn validate(self) -> Result<Self, ApiError> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(ApiError::bad_request("email and password are required"));
        }
        Ok(self)
    }
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    #[serde(flatten)]
    auth: SessionAuth,
    redirect: String,
}

/// POST /api/auth/login - credentials sign-in
///
/// Form posts (the login page) are answered with redirects: to the callback
/// URL or the role's home page on success, back to `/login?error=...` on
/// failure. JSON posts get a JSON envelope instead. Both set the session
/// cookie on success.
pub async fn login_post(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let wants_json = is_json(&headers);

    let request = if wants_json {
        serde_json::from_slice::<LoginRequest>(&body)
            .map_err(|e| ApiError::bad_request(format!("Invalid login body: {}", e)))
    } else {
        LoginRequest::from_form(&body)
    };
    let request = match request.and_then(LoginRequest::validate) {
        Ok(request) => request,
        Err(e) => return e.into_response(),
    };

    let callback = request.callback_url.as_deref().filter(|cb| is_safe_callback(cb));

    let user = match state.credentials.authorize(request.email.trim(), &request.password).await {
        Ok(user) => user,
        Err(err) => return login_failed(err, wants_json, callback),
    };

    let signed = state
        .signer
        .claims_for(user.subject(), user.email.clone(), user.name.clone(), user.role.clone())
        .and_then(|claims| state.signer.sign(&claims).map(|token| (claims, token)));
    let (claims, token) = match signed {
        Ok(signed) => signed,
        Err(e) => return ApiError::from(e).into_response(),
    };

    let session = Session::from(claims);
    let principal = session.principal();
    let redirect = match callback {
        Some(cb) => cb.to_string(),
        None => home_for(&state, &principal),
    };
    tracing::info!(principal = %principal, "Session established");

    let cookie = session_cookie(&state.cookie, &token, state.signer.max_age_secs());
    let response = match (wants_json, session.auth) {
        (true, Some(auth)) => ApiResponse::success(LoginResponse { auth, redirect }).into_response(),
        _ => redirect_found(&redirect),
    };

    attach_cookie(response, &cookie).unwrap_or_else(|e| e.into_response())
}

fn login_failed(err: BackendError, wants_json: bool, callback: Option<&str>) -> Response {
    match &err {
        BackendError::EmailNotFound | BackendError::InvalidCredentials => {
            tracing::warn!("Sign-in rejected: {}", err);
        }
        _ => tracing::error!("Sign-in failed: {}", err),
    }

    if wants_json {
        return ApiError::from(err).into_response();
    }
    redirect_found(&login_error_location(err.login_error_code(), callback))
}

/// Where a freshly signed-in principal lands without a callback URL.
fn home_for(state: &AppState, principal: &Principal) -> String {
    let table = state.gate.table();
    if principal.is_elevated() {
        table.admin_home.clone()
    } else {
        table.storefront_home.clone()
    }
}

/// `/login?error=<code>[&callbackUrl=<cb>]`
pub fn login_error_location(code: &str, callback: Option<&str>) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    query.append_pair("error", code);
    if let Some(cb) = callback {
        query.append_pair("callbackUrl", cb);
    }
    format!("{}?{}", LOGIN_PAGE, query.finish())
}

/// Only same-site absolute paths are honored as callback URLs.
pub fn is_safe_callback(callback: &str) -> bool {
    callback.starts_with('/')
        && !callback.starts_with("//")
        && !callback.contains('\\')
        && !callback.chars().any(char::is_control)
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.trim_start().starts_with("application/json"))
        .unwrap_or(false)
}
