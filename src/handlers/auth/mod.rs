// handlers/auth/mod.rs - session endpoints
//
// POST /api/auth/login   credentials sign-in, sets the session cookie
// POST /api/auth/logout  clears the session cookie
// GET  /api/auth/session the resolved session, `{ "auth": null | {...} }`

pub mod login;
pub mod session;

pub use login::login_post;
pub use session::{logout_post, session_get};

use axum::http::{header, HeaderValue};
use axum::response::Response;

use crate::app::CookieSettings;
use crate::error::ApiError;

/// `Set-Cookie` value carrying a session token.
pub(crate) fn session_cookie(settings: &CookieSettings, token: &str, max_age_secs: u64) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}{}",
        settings.name,
        token,
        max_age_secs,
        if settings.secure { "; Secure" } else { "" }
    )
}

/// `Set-Cookie` value that removes the session cookie.
pub(crate) fn expired_cookie(settings: &CookieSettings) -> String {
    session_cookie(settings, "", 0)
}

pub(crate) fn attach_cookie(mut response: Response, cookie: &str) -> Result<Response, ApiError> {
    let value = HeaderValue::from_str(cookie).map_err(|_| {
        tracing::error!("Session cookie is not a valid header value");
        ApiError::internal_server_error("Unable to create session")
    })?;
    response.headers_mut().append(header::SET_COOKIE, value);
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_flags_follow_settings() {
        let plain = CookieSettings { name: "sid".into(), secure: false };
        let secure = CookieSettings { name: "sid".into(), secure: true };

        assert_eq!(
            session_cookie(&plain, "abc", 60),
            "sid=abc; Path=/; HttpOnly; SameSite=Lax; Max-Age=60"
        );
        assert!(session_cookie(&secure, "abc", 60).ends_with("; Secure"));
        assert!(expired_cookie(&plain).contains("Max-Age=0"));
    }
}
