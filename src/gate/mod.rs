//! Role-based route authorization.
//!
//! The gate answers one question per navigation request: may this principal
//! open this path, or where should they be sent instead. It does no I/O and
//! keeps no state between calls.

pub mod matcher;
pub mod role;
pub mod routes;
pub mod rules;

pub use matcher::{canonical_path, PathMatcher, Pattern};
pub use role::Principal;
pub use routes::RouteTable;
pub use rules::{evaluate, Decision, RuleId, Verdict, RULES};

use crate::config::ConfigError;

/// Route tables plus the compiled matcher, shared across requests.
#[derive(Debug, Clone)]
pub struct RouteGate {
    table: RouteTable,
    matcher: PathMatcher,
}

impl RouteGate {
    pub fn new(table: RouteTable) -> Result<Self, ConfigError> {
        table.validate()?;
        let matcher = PathMatcher::new(&table.matcher)?;
        Ok(Self { table, matcher })
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Whether the gate runs for this path at all.
    pub fn guards(&self, path: &str) -> bool {
        self.matcher.matches(&canonical_path(path))
    }

    pub fn evaluate(&self, path: &str, principal: &Principal) -> Verdict {
        rules::evaluate(&self.table, &canonical_path(path), principal)
    }

    pub fn decide(&self, path: &str, principal: &Principal) -> Decision {
        self.evaluate(path, principal).decision
    }

    /// Full pipeline view: paths outside the matcher always continue.
    ///
    /// Takes the raw request path; matching and rules both see it decoded.
    pub fn check(&self, path: &str, principal: &Principal) -> Option<Verdict> {
        let path = canonical_path(path);
        if self.matcher.matches(&path) {
            Some(rules::evaluate(&self.table, &path, principal))
        } else {
            None
        }
    }
}
