use serde::Serialize;
use std::fmt;

use super::role::Principal;
use super::routes::RouteTable;

/// What the hosting pipeline should do with a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "target", rename_all = "snake_case")]
pub enum Decision {
    Continue,
    RedirectTo(String),
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Continue => write!(f, "continue"),
            Decision::RedirectTo(target) => write!(f, "redirect -> {}", target),
        }
    }
}

/// Names of the rules, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    ElevatedStorefront,
    PublicPage,
    AnonymousVisitor,
    AdminAllowList,
    SuperAdminAllowList,
    UserAllowList,
    OtherRole,
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RuleId::ElevatedStorefront => "elevated_storefront",
            RuleId::PublicPage => "public_page",
            RuleId::AnonymousVisitor => "anonymous_visitor",
            RuleId::AdminAllowList => "admin_allow_list",
            RuleId::SuperAdminAllowList => "super_admin_allow_list",
            RuleId::UserAllowList => "user_allow_list",
            RuleId::OtherRole => "other_role",
        };
        f.write_str(name)
    }
}

/// Everything a rule gets to look at.
#[derive(Debug, Clone, Copy)]
pub struct RuleInput<'a> {
    pub table: &'a RouteTable,
    pub path: &'a str,
    pub principal: &'a Principal,
}

/// A predicate and the outcome it produces once it applies.
pub struct Rule {
    pub id: RuleId,
    pub applies: fn(&RuleInput<'_>) -> bool,
    pub outcome: fn(&RuleInput<'_>) -> Decision,
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule").field("id", &self.id).finish()
    }
}

/// Result of running the rule list: the decision and which rule made it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub rule: RuleId,
    pub decision: Decision,
}

/// The rule list. First rule whose predicate holds decides.
pub static RULES: [Rule; 7] = [
    Rule {
        id: RuleId::ElevatedStorefront,
        applies: |input| {
            input.principal.is_elevated() && input.table.is_elevated_storefront(input.path)
        },
        outcome: |input| Decision::RedirectTo(input.table.admin_home.clone()),
    },
    Rule {
        id: RuleId::PublicPage,
        applies: |input| input.table.is_public(input.path),
        outcome: |_| Decision::Continue,
    },
    Rule {
        id: RuleId::AnonymousVisitor,
        applies: |input| input.principal.is_anonymous(),
        outcome: |input| Decision::RedirectTo(input.table.storefront_home.clone()),
    },
    Rule {
        id: RuleId::AdminAllowList,
        applies: |input| matches!(input.principal, Principal::Admin),
        outcome: |input| allow_or(input, &input.table.admin_home),
    },
    Rule {
        id: RuleId::SuperAdminAllowList,
        applies: |input| matches!(input.principal, Principal::Super),
        outcome: |input| allow_or(input, &input.table.admin_home),
    },
    Rule {
        id: RuleId::UserAllowList,
        applies: |input| matches!(input.principal, Principal::User),
        outcome: |input| allow_or(input, &input.table.storefront_home),
    },
    Rule {
        id: RuleId::OtherRole,
        applies: |_| true,
        outcome: |_| Decision::Continue,
    },
];

fn allow_or(input: &RuleInput<'_>, fallback: &str) -> Decision {
    if input.table.allows(input.principal, input.path) {
        Decision::Continue
    } else {
        Decision::RedirectTo(fallback.to_string())
    }
}

/// Run the rule list for one request.
pub fn evaluate(table: &RouteTable, path: &str, principal: &Principal) -> Verdict {
    let input = RuleInput {
        table,
        path,
        principal,
    };

    RULES
        .iter()
        .find(|rule| (rule.applies)(&input))
        .map(|rule| Verdict {
            rule: rule.id,
            decision: (rule.outcome)(&input),
        })
        // OtherRole always applies, this is only reached with an edited list
        .unwrap_or(Verdict {
            rule: RuleId::OtherRole,
            decision: Decision::Continue,
        })
}
