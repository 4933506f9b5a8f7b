use serde::Serialize;
use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Print a command result: pretty JSON envelope, or the text lines as-is.
pub fn output<T: Serialize>(output_format: OutputFormat, data: &T, text: &[String]) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let response: Value = json!({
                "success": true,
                "data": serde_json::to_value(data)?
            });
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            for line in text {
                println!("{}", line);
            }
        }
    }
    Ok(())
}

/// Render a list of paths as an indented block, or a placeholder when empty.
pub fn path_block(title: &str, paths: &[&str]) -> Vec<String> {
    let mut lines = vec![format!("{}:", title)];
    if paths.is_empty() {
        lines.push("  (none)".to_string());
    } else {
        lines.extend(paths.iter().map(|p| format!("  {}", p)));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_block_lists_or_marks_empty() {
        assert_eq!(path_block("gaps", &[]), vec!["gaps:", "  (none)"]);
        assert_eq!(path_block("admin", &["/admin/dashboard"]), vec!["admin:", "  /admin/dashboard"]);
    }
}
