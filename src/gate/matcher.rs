use percent_encoding::percent_decode_str;
use std::borrow::Cow;

use crate::config::ConfigError;

/// One entry of the middleware matcher.
///
/// `/admin/:path*` matches `/admin` and everything below it; any other
/// pattern is a literal path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    Exact(String),
    Subtree(String),
}

impl Pattern {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        if !raw.starts_with('/') {
            return Err(ConfigError::InvalidPattern {
                pattern: raw.to_string(),
                reason: "must start with '/'".to_string(),
            });
        }

        if let Some(base) = raw.strip_suffix("/:path*") {
            if base.contains(':') || base.contains('*') {
                return Err(ConfigError::InvalidPattern {
                    pattern: raw.to_string(),
                    reason: "only a trailing '/:path*' segment is supported".to_string(),
                });
            }
            return Ok(Pattern::Subtree(base.to_string()));
        }

        if raw.contains(':') || raw.contains('*') {
            return Err(ConfigError::InvalidPattern {
                pattern: raw.to_string(),
                reason: "only a trailing '/:path*' segment is supported".to_string(),
            });
        }

        Ok(Pattern::Exact(normalize(raw).to_string()))
    }

    pub fn matches(&self, path: &str) -> bool {
        let path = normalize(path);
        match self {
            Pattern::Exact(literal) => path == literal,
            // "/:path*" on its own has an empty base and covers every path
            Pattern::Subtree(base) if base.is_empty() => true,
            Pattern::Subtree(base) => {
                path == base
                    || (path.starts_with(base.as_str()) && path[base.len()..].starts_with('/'))
            }
        }
    }
}

/// Decides which request paths the gate runs for. Anything else bypasses it.
#[derive(Debug, Clone, Default)]
pub struct PathMatcher {
    patterns: Vec<Pattern>,
}

impl PathMatcher {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ConfigError> {
        let patterns = patterns
            .iter()
            .map(|p| Pattern::parse(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn matches(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(path))
    }
}

/// Percent-decoded form of a request path, the form pages are served under.
///
/// `/%61dmin` and `/admin%2Fwarehouse` are decided as `/admin` and
/// `/admin/warehouse`. Bytes that are not valid UTF-8 become U+FFFD, which no
/// table lists.
pub fn canonical_path(raw: &str) -> Cow<'_, str> {
    percent_decode_str(raw).decode_utf8_lossy()
}

/// Strip a trailing slash, keeping the root path intact.
pub(crate) fn normalize(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_patterns_ignore_trailing_slash() {
        let pattern = Pattern::parse("/checkout").unwrap();
        assert!(pattern.matches("/checkout"));
        assert!(pattern.matches("/checkout/"));
        assert!(!pattern.matches("/checkout/step-2"));
        assert!(!pattern.matches("/checkouts"));
    }

    #[test]
    fn subtree_covers_base_and_children_only() {
        let pattern = Pattern::parse("/admin/:path*").unwrap();
        assert!(pattern.matches("/admin"));
        assert!(pattern.matches("/admin/dashboard"));
        assert!(pattern.matches("/admin/report/sales"));
        assert!(!pattern.matches("/administrator"));
        assert!(!pattern.matches("/"));
    }

    #[test]
    fn root_subtree_matches_everything() {
        let pattern = Pattern::parse("/:path*").unwrap();
        assert!(pattern.matches("/"));
        assert!(pattern.matches("/anything/at/all"));
    }

    #[test]
    fn root_literal_only_matches_root() {
        let matcher = PathMatcher::new(&["/"]).unwrap();
        assert!(matcher.matches("/"));
        assert!(!matcher.matches("/login"));
    }

    #[test]
    fn rejects_unsupported_syntax() {
        assert!(Pattern::parse("admin").is_err());
        assert!(Pattern::parse("/product/:id").is_err());
        assert!(Pattern::parse("/a/:x/:path*").is_err());
    }

    #[test]
    fn canonical_path_decodes_escapes() {
        assert_eq!(canonical_path("/%61dmin/warehouse"), "/admin/warehouse");
        assert_eq!(canonical_path("/admin%2Fwarehouse"), "/admin/warehouse");
        assert_eq!(canonical_path("/checkout"), "/checkout");
        assert_eq!(canonical_path("/admin/%FF"), "/admin/\u{FFFD}");
    }

    #[test]
    fn matcher_bypasses_unlisted_paths() {
        let matcher = PathMatcher::new(&["/", "/admin/:path*", "/profile"]).unwrap();
        assert!(matcher.matches("/profile"));
        assert!(matcher.matches("/admin/order"));
        assert!(!matcher.matches("/api/auth/session"));
        assert!(!matcher.matches("/health"));
    }
}
