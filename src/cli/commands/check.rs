use clap::Args;
use serde::Serialize;

use crate::cli::{utils, OutputFormat};
use crate::config::AppConfig;
use crate::gate::{Decision, Principal, RouteGate, RuleId};

#[derive(Debug, Args)]
pub struct CheckArgs {
    #[arg(help = "Request path, e.g. /admin/category")]
    pub path: String,

    #[arg(long, help = "USER, ADMIN, SUPER, any other role name, or omit for anonymous")]
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub path: String,
    pub principal: Principal,
    /// False when the matcher skips the path entirely
    pub guarded: bool,
    pub rule: Option<RuleId>,
    pub decision: Decision,
}

/// Run the gate for one (path, role) pair without a server.
pub fn check(gate: &RouteGate, path: &str, role: Option<&str>) -> CheckReport {
    let principal = role.map(Principal::parse_loose).unwrap_or_default();
    match gate.check(path, &principal) {
        Some(verdict) => CheckReport {
            path: path.to_string(),
            principal,
            guarded: true,
            rule: Some(verdict.rule),
            decision: verdict.decision,
        },
        None => CheckReport {
            path: path.to_string(),
            principal,
            guarded: false,
            rule: None,
            decision: Decision::Continue,
        },
    }
}

pub fn handle(args: CheckArgs, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let gate = RouteGate::new(config.route_table()?)?;
    let report = check(&gate, &args.path, args.role.as_deref());

    let text = match &report.rule {
        Some(rule) => vec![format!("{} as {}: {} ({})", report.path, report.principal, report.decision, rule)],
        None => vec![format!("{} is outside the matcher: continue", report.path)],
    };
    utils::output(output_format, &report, &text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::RouteTable;

    fn gate() -> RouteGate {
        RouteGate::new(RouteTable::default()).unwrap()
    }

    #[test]
    fn reports_rule_and_decision() {
        let report = check(&gate(), "/admin/warehouse", Some("admin"));
        assert!(report.guarded);
        assert_eq!(report.principal, Principal::Admin);
        assert_eq!(report.rule, Some(RuleId::AdminAllowList));
        assert_eq!(report.decision, Decision::RedirectTo("/admin/dashboard".into()));
    }

    #[test]
    fn no_role_means_anonymous() {
        let report = check(&gate(), "/checkout", None);
        assert_eq!(report.principal, Principal::Anonymous);
        assert_eq!(report.decision, Decision::RedirectTo("/".into()));
    }

    #[test]
    fn unguarded_paths_continue() {
        let report = check(&gate(), "/api/auth/session", Some("USER"));
        assert!(!report.guarded);
        assert_eq!(report.rule, None);
        assert_eq!(report.decision, Decision::Continue);
    }
}
