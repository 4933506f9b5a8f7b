use serde::{Deserialize, Serialize};
use std::fmt;

/// Who is asking for a page, as far as the gate is concerned.
///
/// The session's role claim is an open string; it is closed here so that the
/// "authenticated but unrecognized role" case is a variant of its own rather
/// than whatever a missing match arm happens to do.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "role", rename_all = "snake_case")]
pub enum Principal {
    /// No session, or a session that failed to resolve
    #[default]
    Anonymous,
    User,
    Admin,
    Super,
    /// Authenticated with a role claim outside USER/ADMIN/SUPER (possibly empty)
    Other(String),
}

impl Principal {
    /// Map the role claim of an authenticated session.
    ///
    /// Matching is exact, the backend issues upper-case role names.
    pub fn from_role_claim(role: Option<&str>) -> Self {
        match role {
            Some("USER") => Principal::User,
            Some("ADMIN") => Principal::Admin,
            Some("SUPER") => Principal::Super,
            Some(other) => Principal::Other(other.to_string()),
            None => Principal::Other(String::new()),
        }
    }

    /// Parse an operator-supplied role name (CLI, tests). Accepts any case and
    /// `anonymous`/`none` for the unauthenticated principal.
    pub fn parse_loose(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "" | "NONE" | "ANONYMOUS" => Principal::Anonymous,
            "USER" => Principal::User,
            "ADMIN" => Principal::Admin,
            "SUPER" => Principal::Super,
            _ => Principal::Other(value.trim().to_string()),
        }
    }

    /// ADMIN and SUPER never see the storefront.
    pub fn is_elevated(&self) -> bool {
        matches!(self, Principal::Admin | Principal::Super)
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Principal::Anonymous)
    }

    /// Role claim as it would appear in a session token.
    pub fn role_claim(&self) -> Option<&str> {
        match self {
            Principal::Anonymous => None,
            Principal::User => Some("USER"),
            Principal::Admin => Some("ADMIN"),
            Principal::Super => Some("SUPER"),
            Principal::Other(role) => Some(role.as_str()),
        }
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Principal::Anonymous => write!(f, "anonymous"),
            Principal::Other(role) if role.is_empty() => write!(f, "other(<none>)"),
            Principal::Other(role) => write!(f, "other({})", role),
            known => write!(f, "{}", known.role_claim().unwrap_or_default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_claims_map_to_known_variants() {
        assert_eq!(Principal::from_role_claim(Some("USER")), Principal::User);
        assert_eq!(Principal::from_role_claim(Some("ADMIN")), Principal::Admin);
        assert_eq!(Principal::from_role_claim(Some("SUPER")), Principal::Super);
    }

    #[test]
    fn unknown_or_missing_claim_is_other_not_anonymous() {
        assert_eq!(
            Principal::from_role_claim(Some("admin")),
            Principal::Other("admin".to_string())
        );
        assert_eq!(Principal::from_role_claim(None), Principal::Other(String::new()));
        assert!(!Principal::from_role_claim(None).is_anonymous());
    }

    #[test]
    fn loose_parsing_for_operators() {
        assert_eq!(Principal::parse_loose("none"), Principal::Anonymous);
        assert_eq!(Principal::parse_loose("super"), Principal::Super);
        assert_eq!(Principal::parse_loose(" Admin "), Principal::Admin);
        assert_eq!(
            Principal::parse_loose("VENDOR"),
            Principal::Other("VENDOR".to_string())
        );
    }

    #[test]
    fn display_is_stable() {
        assert_eq!(Principal::Admin.to_string(), "ADMIN");
        assert_eq!(Principal::Anonymous.to_string(), "anonymous");
        assert_eq!(Principal::Other("X".into()).to_string(), "other(X)");
    }
}
