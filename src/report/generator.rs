//! Report rendering and persistence.
//!
//! The JSON document is the primary output; a Markdown rendering of the same
//! report is available for humans. Either form is written through a
//! temporary file in the target directory and renamed into place.

use crate::cli::OutputFormat;
use crate::error::{MetricsError, Result};
use crate::models::{DailyTrend, Report, Summary, ToolCount};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Generate the JSON document (two-space indent, non-ASCII kept as-is).
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Generate a Markdown rendering of the report.
pub fn generate_markdown_report(report: &Report) -> String {
    let mut output = String::new();

    output.push_str("# Team Metrics\n\n");
    output.push_str(&format!(
        "*Generated {}*\n\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    output.push_str(&generate_summary_section(&report.summary));
    output.push_str(&generate_breakdown_section(report));
    output.push_str(&generate_tools_section("Top Tools", &report.top_tools));
    output.push_str(&generate_tools_section("Top MCP Tools", &report.top_mcp_tools));
    output.push_str(&generate_trend_section(&report.daily_trend));
    output.push_str(&generate_active_section(&report.active_employee_names));

    output
}

fn generate_summary_section(summary: &Summary) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");
    section.push_str("| Metric | Value |\n");
    section.push_str("|:---|---:|\n");
    section.push_str(&format!("| Sessions | {} |\n", summary.sessions));
    section.push_str(&format!("| Messages | {} |\n", summary.messages));
    section.push_str(&format!("| Tool calls | {} |\n", summary.total_tool_calls));
    section.push_str(&format!("| Skill calls | {} |\n", summary.skill_calls));
    section.push_str(&format!("| Subagent calls | {} |\n", summary.subagent_calls));
    section.push_str(&format!("| MCP calls | {} |\n", summary.mcp_calls));
    section.push_str(&format!(
        "| Active employees | {}/{} |\n\n",
        summary.active_employees, summary.total_employees
    ));

    section
}

fn generate_breakdown_section(report: &Report) -> String {
    if report.tool_breakdown.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Tool Breakdown\n\n");
    section.push_str("| Category | Calls |\n");
    section.push_str("|:---|---:|\n");
    for (category, count) in &report.tool_breakdown {
        section.push_str(&format!("| {} | {} |\n", category, count));
    }
    section.push('\n');

    section
}

fn generate_tools_section(title: &str, tools: &[ToolCount]) -> String {
    if tools.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str(&format!("## {}\n\n", title));
    section.push_str("| # | Tool | Calls |\n");
    section.push_str("|---:|:---|---:|\n");
    for (i, tool) in tools.iter().enumerate() {
        section.push_str(&format!("| {} | `{}` | {} |\n", i + 1, tool.name, tool.count));
    }
    section.push('\n');

    section
}

fn generate_trend_section(trend: &[DailyTrend]) -> String {
    if trend.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Daily Trend\n\n");
    section.push_str("| Date | Sessions | Tools | Messages |\n");
    section.push_str("|:---|---:|---:|---:|\n");
    for day in trend {
        section.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            day.date, day.sessions, day.tools, day.messages
        ));
    }
    section.push('\n');

    section
}

fn generate_active_section(names: &[String]) -> String {
    let mut section = String::new();

    section.push_str("## Active Employees\n\n");
    if names.is_empty() {
        section.push_str("No activity recorded.\n");
    } else {
        for name in names {
            section.push_str(&format!("- {}\n", name));
        }
    }

    section
}

/// Write the report to `path`, creating the parent directory if needed.
///
/// The content goes to a temporary file beside the target which is then
/// renamed over it, so the target is either fully written or untouched.
pub fn write_report(report: &Report, path: &Path, format: OutputFormat) -> Result<()> {
    let content = match format {
        OutputFormat::Json => generate_json_report(report)?,
        OutputFormat::Markdown => generate_markdown_report(report),
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    std::fs::create_dir_all(&dir).map_err(|source| MetricsError::CreateDir {
        path: dir.clone(),
        source,
    })?;

    let write_err = |source| MetricsError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut file = NamedTempFile::new_in(&dir).map_err(write_err)?;
    file.write_all(content.as_bytes()).map_err(write_err)?;
    file.as_file().sync_all().map_err(write_err)?;
    file.persist(path).map_err(|e| write_err(e.error))?;

    debug!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}
