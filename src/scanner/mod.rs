//! Session log discovery.
//!
//! Logs live in `<logs_dir>/<source-dir>/*.jsonl`, one source directory per
//! project. Only source directories whose name contains the filter keyword
//! are considered.

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Configuration for log discovery.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Substring a source directory name must contain.
    pub filter_keyword: String,
    /// Log file extension (without dot).
    pub extension: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            filter_keyword: "my-ai-team".to_string(),
            extension: "jsonl".to_string(),
        }
    }
}

impl From<&crate::config::GeneralConfig> for ScanConfig {
    fn from(config: &crate::config::GeneralConfig) -> Self {
        Self {
            filter_keyword: config.filter_keyword.clone(),
            ..Self::default()
        }
    }
}

/// A discovered log file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFile {
    /// Full path to the file.
    pub path: PathBuf,
    /// Name of the source directory holding the file.
    pub dir_name: String,
    /// File size in bytes.
    pub size: u64,
}

/// Scanner for session log files.
pub struct LogScanner {
    config: ScanConfig,
    logs_root: PathBuf,
}

impl LogScanner {
    /// Create a new scanner.
    pub fn new(logs_root: PathBuf, config: ScanConfig) -> Self {
        Self { config, logs_root }
    }

    /// Scan for all matching log files, sorted by path.
    pub fn scan(&self) -> Result<Vec<LogFile>> {
        if !self.logs_root.is_dir() {
            warn!("Logs directory not found: {}", self.logs_root.display());
            return Ok(Vec::new());
        }

        // Source directories sit at depth 1 and must pass through
        // filter_entry, so depth is bounded from below in the loop.
        let walker = WalkDir::new(&self.logs_root)
            .max_depth(2)
            .follow_links(true)
            .into_iter()
            .filter_entry(|entry| self.keep_entry(entry));

        let mut files = Vec::new();

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    debug!("Cannot read log entry: {}", e);
                    continue;
                }
            };

            if entry.depth() != 2 || !entry.file_type().is_file() || !self.matches(entry.path())
            {
                continue;
            }

            let dir_name = entry
                .path()
                .parent()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);

            files.push(LogFile {
                path: entry.into_path(),
                dir_name,
                size,
            });
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));
        debug!(
            "Discovered {} log files under {}",
            files.len(),
            self.logs_root.display()
        );

        Ok(files)
    }

    /// Check if a file has the log extension.
    pub fn matches(&self, path: &Path) -> bool {
        path.extension().and_then(|e| e.to_str()) == Some(self.config.extension.as_str())
    }

    /// Check if a directory name marks a source to scan.
    pub fn is_source_dir(&self, name: &str) -> bool {
        name.contains(self.config.filter_keyword.as_str())
    }

    /// Prune hidden entries and non-matching source directories.
    fn keep_entry(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 {
            return true;
        }

        let name = entry.file_name().to_string_lossy();
        if name.starts_with('.') {
            return false;
        }

        entry.depth() != 1 || (entry.file_type().is_dir() && self.is_source_dir(&name))
    }
}
