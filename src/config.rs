//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.team-metrics.toml` files.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".team-metrics.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,

    /// Actor table, in match order.
    #[serde(default = "default_actors")]
    pub actors: Vec<ActorConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            report: ReportConfig::default(),
            actors: default_actors(),
        }
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Directory holding one subdirectory per log source. A leading `~` is
    /// expanded to the home directory.
    #[serde(default = "default_logs_dir")]
    pub logs_dir: String,

    /// Output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Only source directories whose name contains this keyword are scanned.
    #[serde(default = "default_filter_keyword")]
    pub filter_keyword: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            logs_dir: default_logs_dir(),
            output: default_output(),
            filter_keyword: default_filter_keyword(),
        }
    }
}

fn default_logs_dir() -> String {
    "~/.claude/projects".to_string()
}

fn default_output() -> String {
    "public/team-metrics.json".to_string()
}

fn default_filter_keyword() -> String {
    "my-ai-team".to_string()
}

/// Report shaping settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Number of most recent days kept in the daily trend.
    #[serde(default = "default_trend_days")]
    pub trend_days: usize,

    /// Number of entries in the top tools ranking.
    #[serde(default = "default_top_tools")]
    pub top_tools: usize,

    /// Number of entries in the top MCP tools ranking.
    #[serde(default = "default_top_mcp_tools")]
    pub top_mcp_tools: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            trend_days: default_trend_days(),
            top_tools: default_top_tools(),
            top_mcp_tools: default_top_mcp_tools(),
        }
    }
}

fn default_trend_days() -> usize {
    14
}

fn default_top_tools() -> usize {
    15
}

fn default_top_mcp_tools() -> usize {
    10
}

/// One actor table entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorConfig {
    /// Display name of the actor.
    pub name: String,
    /// Substring identifying the actor's log directories.
    pub keyword: String,
}

impl ActorConfig {
    pub fn new(name: &str, keyword: &str) -> Self {
        Self {
            name: name.to_string(),
            keyword: keyword.to_string(),
        }
    }
}

fn default_actors() -> Vec<ActorConfig> {
    [
        ("リン", "executive-COO"),
        ("ミナミ", "secretary"),
        ("マコト", "hr"),
        ("ソウ", "web-team"),
        ("ナギ", "web-team"),
        ("ユウ", "web-team"),
        ("カイト", "web-team"),
        ("コトハ", "note-team"),
        ("ツムギ", "note-team"),
        ("レン", "note-team"),
        ("ソラ", "note-team"),
        ("ヒカル", "creative-team"),
        ("カナデ", "creative-team"),
        ("カノン", "creative-team"),
        ("アヤ", "slides-team"),
        ("ハルカ", "slides-team"),
        ("ユキ", "prompt-team"),
        ("タクミ", "coach"),
        ("シオン", "coach"),
    ]
    .into_iter()
    .map(|(name, keyword)| ActorConfig::new(name, keyword))
    .collect()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(config)
    }

    /// Reject settings the command line would also reject.
    pub fn validate(&self) -> Result<()> {
        if self.general.filter_keyword.is_empty() {
            bail!("filter_keyword must not be empty");
        }
        if self.report.trend_days == 0 {
            bail!("trend_days must be at least 1");
        }
        if self.report.top_tools == 0 {
            bail!("top_tools must be at least 1");
        }
        if self.report.top_mcp_tools == 0 {
            bail!("top_mcp_tools must be at least 1");
        }
        Ok(())
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref logs_dir) = args.logs_dir {
            self.general.logs_dir = logs_dir.display().to_string();
        }
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }
        if let Some(ref filter) = args.filter {
            self.general.filter_keyword = filter.clone();
        }
        if let Some(days) = args.trend_days {
            self.report.trend_days = days;
        }
    }

    /// Resolved logs directory with `~` expanded.
    pub fn logs_dir(&self) -> PathBuf {
        expand_home(&self.general.logs_dir)
    }

    /// Resolved output path.
    pub fn output_path(&self) -> PathBuf {
        expand_home(&self.general.output)
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

/// Expand a leading `~` to the user's home directory.
fn expand_home(path: &str) -> PathBuf {
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => return PathBuf::from(path),
    };

    match dirs::home_dir() {
        Some(home) if rest.is_empty() => home,
        Some(home) => home.join(rest),
        None => PathBuf::from(path),
    }
}
