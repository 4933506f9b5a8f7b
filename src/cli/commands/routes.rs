use serde::Serialize;

use crate::cli::{utils, OutputFormat};
use crate::config::AppConfig;
use crate::gate::{RouteGate, RouteTable};

#[derive(Debug, Serialize)]
pub struct RoutesReport<'a> {
    pub table: &'a RouteTable,
    pub super_admin: Vec<&'a str>,
    pub coverage_gaps: Vec<&'a str>,
}

pub fn report(table: &RouteTable) -> RoutesReport<'_> {
    RoutesReport {
        table,
        super_admin: table.super_admin_routes(),
        coverage_gaps: table.coverage_gaps(),
    }
}

pub fn handle(config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    // Build the gate so a bad matcher fails here the same way it fails the server
    let gate = RouteGate::new(config.route_table()?)?;
    let table = gate.table();
    let summary = report(table);

    let mut text = Vec::new();
    text.extend(utils::path_block("public", &as_strs(&table.public)));
    text.extend(utils::path_block("public prefixes", &as_strs(&table.public_prefixes)));
    text.extend(utils::path_block("admin", &as_strs(&table.admin)));
    text.extend(utils::path_block("super admin", &summary.super_admin));
    text.extend(utils::path_block("user", &as_strs(&table.user)));
    text.extend(utils::path_block("matcher", &as_strs(&table.matcher)));
    text.extend(utils::path_block("served but not in any table", &summary.coverage_gaps));

    utils::output(output_format, &summary, &text)
}

fn as_strs(paths: &[String]) -> Vec<&str> {
    paths.iter().map(String::as_str).collect()
}
