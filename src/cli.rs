//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// team-metrics - aggregate AI team session logs into a metrics document
///
/// Scans Claude Code session logs, attributes them to AI team members and
/// writes tool, message and daily activity totals as JSON.
///
/// Examples:
///   team-metrics
///   team-metrics --logs-dir ./logs --output out/metrics.json
///   team-metrics --format markdown --output metrics.md
///   team-metrics --dry-run
///   team-metrics --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Directory containing one subdirectory per log source
    ///
    /// Defaults to ~/.claude/projects or the value in .team-metrics.toml.
    #[arg(long, value_name = "DIR", env = "TEAM_METRICS_LOGS_DIR")]
    pub logs_dir: Option<PathBuf>,

    /// Output file path for the metrics document
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Only scan source directories whose name contains this keyword
    #[arg(long, value_name = "KEYWORD")]
    pub filter: Option<String>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .team-metrics.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format (json, markdown)
    #[arg(long, default_value = "json", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Number of most recent days in the daily trend
    #[arg(long, value_name = "DAYS")]
    pub trend_days: Option<usize>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Dry run: list the log files that would be scanned and exit
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .team-metrics.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON document (default)
    #[default]
    Json,
    /// Markdown summary
    Markdown,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.trend_days == Some(0) {
            return Err("Trend days must be at least 1".to_string());
        }

        if let Some(ref filter) = self.filter {
            if filter.is_empty() {
                return Err("Filter keyword must not be empty".to_string());
            }
        }

        if let Some(ref logs_dir) = self.logs_dir {
            if logs_dir.exists() && !logs_dir.is_dir() {
                return Err(format!(
                    "Logs path is not a directory: {}",
                    logs_dir.display()
                ));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            logs_dir: None,
            output: None,
            filter: None,
            config: None,
            format: OutputFormat::Json,
            trend_days: None,
            verbose: false,
            quiet: false,
            dry_run: false,
            init_config: false,
        }
    }

    #[test]
    fn test_no_arguments_required() {
        let args = Args::try_parse_from(["team-metrics"]).unwrap();
        assert_eq!(args.format, OutputFormat::Json);
        assert!(args.output.is_none());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_parse_flags() {
        let args = Args::try_parse_from([
            "team-metrics",
            "--output",
            "out.md",
            "--format",
            "markdown",
            "--filter",
            "team",
            "--trend-days",
            "7",
        ])
        .unwrap();

        assert_eq!(args.output, Some(PathBuf::from("out.md")));
        assert_eq!(args.format, OutputFormat::Markdown);
        assert_eq!(args.filter.as_deref(), Some("team"));
        assert_eq!(args.trend_days, Some(7));
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_trend_days() {
        let mut args = make_args();
        args.trend_days = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_empty_filter() {
        let mut args = make_args();
        args.filter = Some(String::new());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
