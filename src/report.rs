//! Output formatting for analysis results.
//!
//! Supports two output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: the full analysis plus its summary, for programmatic consumption

use colored::*;
use serde::{Deserialize, Serialize};

use crate::detect::{Finding, FindingKind};
use crate::record::{RepositoryAnalysis, Summary};

// =============================================================================
// JSON Format
// =============================================================================

/// Top-level JSON document.
#[derive(Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,
    pub summary: Summary,
    pub analysis: RepositoryAnalysis,
}

impl JsonReport {
    pub fn new(path: &str, config_path: Option<&str>, analysis: &RepositoryAnalysis) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            path: path.to_string(),
            config: config_path.map(str::to_string),
            summary: analysis.summary(),
            analysis: analysis.clone(),
        }
    }
}

/// Write results in JSON format.
pub fn write_json(
    path: &str,
    config_path: Option<&str>,
    analysis: &RepositoryAnalysis,
) -> anyhow::Result<()> {
    let report = JsonReport::new(path, config_path, analysis);
    let json = serde_json::to_string_pretty(&report)?;
    println!("{}", json);
    Ok(())
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write results as colored terminal output.
pub fn write_pretty(path: &str, config_path: Option<&str>, analysis: &RepositoryAnalysis) {
    let summary = analysis.summary();

    // Header
    println!();
    print!("  ");
    print!("{}", "repo-scout".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    print!("  {}", "Scanning: ".dimmed());
    println!("{}", path);
    print!("  {}", "Config:   ".dimmed());
    println!("{}", config_path.unwrap_or("(defaults)"));
    println!();

    write_summary(&summary);
    println!();

    if !summary.categories.is_empty() {
        write_categories(analysis);
        println!();
    }

    if !analysis.findings.is_empty() {
        write_findings(&analysis.findings);
        println!();
    }

    if !analysis.parse_errors.is_empty() {
        println!(
            "  {} ({}):",
            "Parse errors".bold(),
            analysis.parse_errors.len()
        );
        for e in &analysis.parse_errors {
            println!("    {}  {}", e.file.blue(), e.reason.dimmed());
        }
        println!();
    }

    write_final_status(&summary);
    println!();
}

fn write_summary(summary: &Summary) {
    println!("  {}", "Summary:".bold());
    println!("    {:<18} {:>5}", "files scanned", summary.files_scanned);
    println!("    {:<18} {:>5}", "callables", summary.callables);
    println!("    {:<18} {:>5}", "aggregate types", summary.aggregate_types);
    println!("    {:<18} {:>5}", "parse errors", summary.parse_errors);
}

fn write_categories(analysis: &RepositoryAnalysis) {
    println!("  {}:", "Classifications".bold());

    for c in &analysis.classifications {
        print!("    {:<12}", c.category.as_str().magenta());
        print!("{:<32}", c.name);
        print!("{}", c.file.blue());
        println!("{}", format!(":{}", c.line).dimmed());
    }
}

fn write_findings(findings: &[Finding]) {
    println!("  {} ({}):", "Findings".bold(), findings.len());
    println!();

    for f in findings {
        match f.kind {
            FindingKind::Secret => print!("    {} ", "SECRET".red()),
            FindingKind::Suspicious => print!("    {} ", "SUSPCT".yellow()),
        }
        print!("  {}", f.file.blue());
        println!("{}", format!(":{}", f.line).dimmed());
        println!("             {}", f.context);
        println!();
    }
}

fn write_final_status(summary: &Summary) {
    let line = format!(
        "{} secret(s), {} suspicious pattern(s)",
        summary.secrets, summary.suspicious
    );
    if summary.secrets > 0 {
        println!("  {} {}", "✗".red(), line.red());
    } else if summary.suspicious > 0 {
        println!("  {} {}", "!".yellow(), line.yellow());
    } else {
        println!("  {} {}", "✓".green(), line.green());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ParseError;

    #[test]
    fn test_json_report_shape() {
        let analysis = RepositoryAnalysis {
            files_scanned: 1,
            parse_errors: vec![ParseError {
                file: "bad.py".to_string(),
                reason: "syntax error: invalid syntax at line 1".to_string(),
            }],
            ..Default::default()
        };

        let report = JsonReport::new("/repo", None, &analysis);
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["path"], "/repo");
        assert!(value.get("config").is_none());
        assert_eq!(value["summary"]["files_scanned"], 1);
        assert_eq!(value["summary"]["parse_errors"], 1);
        assert_eq!(value["analysis"]["parse_errors"][0]["file"], "bad.py");

        let back: JsonReport = serde_json::from_value(value).unwrap();
        assert_eq!(back.analysis, analysis);
    }
}
