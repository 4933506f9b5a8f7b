use axum::http::{header, HeaderMap};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::{SessionClaims, TokenSigner};
use crate::gate::Principal;

/// Resolved session for one request: `{ "auth": null }` when anonymous.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub auth: Option<SessionAuth>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionAuth {
    pub user: SessionUser,
    pub expires: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self { auth: None }
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.is_some()
    }

    pub fn principal(&self) -> Principal {
        match &self.auth {
            None => Principal::Anonymous,
            Some(auth) => Principal::from_role_claim(auth.user.role.as_deref()),
        }
    }
}

impl From<SessionClaims> for Session {
    fn from(claims: SessionClaims) -> Self {
        let expires = Utc.timestamp_opt(claims.exp, 0).single().unwrap_or_else(Utc::now);
        Self {
            auth: Some(SessionAuth {
                user: SessionUser {
                    id: claims.sub,
                    email: claims.email,
                    name: claims.name,
                    role: claims.role,
                },
                expires,
            }),
        }
    }
}

/// Resolve the caller's session from the session cookie or a bearer token.
///
/// Never fails: anything short of a valid, unexpired token is anonymous.
pub fn resolve_session(headers: &HeaderMap, signer: &TokenSigner, cookie_name: &str) -> Session {
    let Some(token) = session_token(headers, cookie_name) else {
        return Session::anonymous();
    };

    match signer.verify(&token) {
        Ok(claims) => Session::from(claims),
        Err(e) => {
            tracing::debug!("Treating request as anonymous: {}", e);
            Session::anonymous()
        }
    }
}

/// Session token from the named cookie, falling back to `Authorization: Bearer`.
pub fn session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    cookie_value(headers, cookie_name).or_else(|| bearer_token(headers))
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value.trim_matches('"').to_string())
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_str = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const COOKIE: &str = "hiimart.session-token";

    fn signer() -> TokenSigner {
        TokenSigner::new("session-test-secret", 1)
    }

    fn token_for(role: Option<&str>) -> String {
        let signer = signer();
        let claims = signer.claims_for(
            "42".into(),
            "shopper@hiimart.test".into(),
            Some("Shopper".into()),
            role.map(str::to_string),
        )
        .unwrap();
        signer.sign(&claims).unwrap()
    }

    fn headers_with(name: header::HeaderName, value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(name, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn no_token_is_anonymous() {
        let session = resolve_session(&HeaderMap::new(), &signer(), COOKIE);
        assert_eq!(session, Session::anonymous());
        assert_eq!(session.principal(), Principal::Anonymous);
    }

    #[test]
    fn cookie_token_resolves_role() {
        let cookie = format!("theme=dark; {}={}; other=1", COOKIE, token_for(Some("ADMIN")));
        let session = resolve_session(&headers_with(header::COOKIE, &cookie), &signer(), COOKIE);
        assert!(session.is_authenticated());
        assert_eq!(session.principal(), Principal::Admin);
    }

    #[test]
    fn bearer_token_is_accepted() {
        let value = format!("Bearer {}", token_for(Some("USER")));
        let session = resolve_session(&headers_with(header::AUTHORIZATION, &value), &signer(), COOKIE);
        assert_eq!(session.principal(), Principal::User);
    }

    #[test]
    fn tampered_token_is_anonymous() {
        let cookie = format!("{}={}x", COOKIE, token_for(Some("SUPER")));
        let session = resolve_session(&headers_with(header::COOKIE, &cookie), &signer(), COOKIE);
        assert_eq!(session.principal(), Principal::Anonymous);
    }

    #[test]
    fn missing_role_claim_is_other() {
        let cookie = format!("{}={}", COOKIE, token_for(None));
        let session = resolve_session(&headers_with(header::COOKIE, &cookie), &signer(), COOKIE);
        assert_eq!(session.principal(), Principal::Other(String::new()));
    }

    #[test]
    fn serializes_to_collaborator_shape() {
        let anonymous = serde_json::to_value(Session::anonymous()).unwrap();
        assert_eq!(anonymous, serde_json::json!({ "auth": null }));

        let cookie = format!("{}={}", COOKIE, token_for(Some("USER")));
        let session = resolve_session(&headers_with(header::COOKIE, &cookie), &signer(), COOKIE);
        let json = serde_json::to_value(session).unwrap();
        assert_eq!(json["auth"]["user"]["role"], "USER");
        assert_eq!(json["auth"]["user"]["email"], "shopper@hiimart.test");
    }

    #[test]
    fn other_cookies_with_similar_names_are_ignored() {
        let cookie = format!("x{}={}", COOKIE, token_for(Some("ADMIN")));
        assert!(session_token(&headers_with(header::COOKIE, &cookie), COOKIE).is_none());
    }
}
