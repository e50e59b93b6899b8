//! team-metrics - AI team usage metrics from Claude Code session logs
//!
//! A CLI tool that scans append-only session logs, attributes each log
//! directory to an AI team member, and aggregates tool invocations,
//! messages and daily activity into one JSON document.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Invalid arguments or config, or the report could not be written

mod analysis;
mod cli;
mod config;
mod error;
mod models;
mod report;
mod scanner;

use analysis::{ActorResolver, Aggregator};
use anyhow::{Context, Result};
use cli::Args;
use config::{Config, CONFIG_FILE_NAME};
use report::ReportSettings;
use scanner::{LogFile, LogScanner, ScanConfig};
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("team-metrics v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args) {
        error!("Run failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .team-metrics.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to customize the logs directory, actors and report sizes.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Discover, aggregate, build and write the report.
fn run(args: Args) -> Result<()> {
    let start_time = Instant::now();

    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let logs_dir = config.logs_dir();
    info!("Scanning logs under: {}", logs_dir.display());

    let scan_config = ScanConfig::from(&config.general);
    let files = LogScanner::new(logs_dir, scan_config).scan()?;
    println!("Found {} session log files", files.len());

    if args.dry_run {
        handle_dry_run(&files);
        return Ok(());
    }

    let aggregator = Aggregator::new(ActorResolver::new(config.actors.clone()), !args.quiet);
    let state = aggregator.run(&files);

    if state.files_skipped > 0 {
        warn!("{} log files could not be read", state.files_skipped);
    }
    debug!(
        "Scanned {} files ({} distinct tools), skipped {} undecodable lines",
        state.files_scanned,
        state.tool_counts.distinct(),
        state.lines_skipped
    );

    let settings = ReportSettings::from(&config.report);
    let metrics = report::build_report(&state, &settings, aggregator.resolver().total_actors());

    let output = config.output_path();
    report::write_report(&metrics, &output, args.format)?;

    let s = &metrics.summary;
    println!("Metrics written to {}", output.display());
    println!("  Sessions: {}", s.sessions);
    println!("  Messages: {}", s.messages);
    println!("  Tool calls: {}", s.total_tool_calls);
    println!("  Skill calls: {}", s.skill_calls);
    println!("  Subagent calls: {}", s.subagent_calls);
    println!("  MCP calls: {}", s.mcp_calls);
    println!(
        "  Active employees: {}/{}",
        s.active_employees, s.total_employees
    );
    info!("Done in {:.1}s", start_time.elapsed().as_secs_f64());

    Ok(())
}

/// Handle --dry-run: print the files that would be scanned.
fn handle_dry_run(files: &[LogFile]) {
    for file in files {
        println!("  📄 {} ({} bytes)", file.path.display(), file.size);
    }
    println!("\n✅ Dry run complete. Nothing was written.");
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}
