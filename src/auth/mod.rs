pub mod session;

pub use session::{resolve_session, Session, SessionAuth, SessionUser};

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;

/// Claims carried by the signed session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub jti: Uuid,
    pub iat: i64,
    pub exp: i64,
}

impl SessionClaims {
    pub fn new(
        sub: String,
        email: String,
        name: Option<String>,
        role: Option<String>,
        expiry_hours: u64,
    ) -> Result<Self, TokenError> {
        let now = Utc::now();
        let exp = i64::try_from(expiry_hours)
            .ok()
            .and_then(Duration::try_hours)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or(TokenError::LifetimeOutOfRange(expiry_hours))?;

        Ok(Self {
            sub,
            email,
            name,
            role,
            jti: Uuid::new_v4(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        })
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("session secret is not configured")]
    MissingSecret,

    #[error("session lifetime of {0} hours is out of range")]
    LifetimeOutOfRange(u64),

    #[error("failed to sign session token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error("invalid session token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),
}

/// Signs and verifies session tokens with the shared HS256 secret.
#[derive(Clone)]
pub struct TokenSigner {
    secret: String,
    expiry_hours: u64,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("secret", &"<redacted>")
            .field("expiry_hours", &self.expiry_hours)
            .finish()
    }
}

impl TokenSigner {
    pub fn new(secret: impl Into<String>, expiry_hours: u64) -> Self {
        Self {
            secret: secret.into(),
            expiry_hours,
        }
    }

    pub fn from_config(security: &SecurityConfig) -> Self {
        Self::new(security.jwt_secret.clone(), security.session_expiry_hours)
    }

    pub fn has_secret(&self) -> bool {
        !self.secret.is_empty()
    }

    /// Claims for a fresh session expiring after the configured lifetime.
    pub fn claims_for(
        &self,
        sub: String,
        email: String,
        name: Option<String>,
        role: Option<String>,
    ) -> Result<SessionClaims, TokenError> {
        SessionClaims::new(sub, email, name, role, self.expiry_hours)
    }

    /// Cookie `Max-Age` matching the token lifetime.
    pub fn max_age_secs(&self) -> u64 {
        self.expiry_hours.saturating_mul(3600)
    }

    pub fn sign(&self, claims: &SessionClaims) -> Result<String, TokenError> {
        if self.secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }

        let encoding_key = EncodingKey::from_secret(self.secret.as_bytes());
        encode(&Header::default(), claims, &encoding_key).map_err(TokenError::Signing)
    }

    pub fn verify(&self, token: &str) -> Result<SessionClaims, TokenError> {
        if self.secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }

        let decoding_key = DecodingKey::from_secret(self.secret.as_bytes());
        let mut validation = Validation::default();
        validation.leeway = 0;

        decode::<SessionClaims>(token, &decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(TokenError::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> TokenSigner {
        TokenSigner::new("test-secret", 1)
    }

    #[test]
    fn signed_tokens_verify() {
        let signer = signer();
        let claims = signer.claims_for("7".into(), "a@hiimart.test".into(), None, Some("ADMIN".into())).unwrap();
        let token = signer.sign(&claims).unwrap();
        assert_eq!(signer.verify(&token).unwrap(), claims);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let claims = signer().claims_for("7".into(), "a@hiimart.test".into(), None, None).unwrap();
        let token = signer().sign(&claims).unwrap();
        let other = TokenSigner::new("other-secret", 1);
        assert!(matches!(other.verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let signer = signer();
        let mut claims = signer
            .claims_for("7".into(), "a@hiimart.test".into(), None, Some("USER".into()))
            .unwrap();
        claims.iat -= 7200;
        claims.exp = claims.iat + 60;
        let token = signer.sign(&claims).unwrap();
        assert!(matches!(signer.verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn empty_secret_refuses_to_sign_or_verify() {
        let signer = TokenSigner::new("", 1);
        let claims = signer.claims_for("7".into(), "a@hiimart.test".into(), None, None).unwrap();
        assert!(matches!(signer.sign(&claims), Err(TokenError::MissingSecret)));
        assert!(matches!(signer.verify("x.y.z"), Err(TokenError::MissingSecret)));
    }

    #[test]
    fn oversized_lifetime_is_an_error() {
        for hours in [1_000_000_000_000, u64::MAX] {
            let signer = TokenSigner::new("test-secret", hours);
            let result = signer.claims_for("7".into(), "a@hiimart.test".into(), None, None);
            assert!(matches!(result, Err(TokenError::LifetimeOutOfRange(h)) if h == hours));
            assert_eq!(signer.max_age_secs(), hours.saturating_mul(3600));
        }
    }

    #[test]
    fn debug_output_hides_secret() {
        assert!(!format!("{:?}", signer()).contains("test-secret"));
    }
}
