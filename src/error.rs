//! Error types for report persistence.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors raised while writing the report.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// The output directory could not be created.
    #[error("cannot create output directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The report file could not be written.
    #[error("cannot write report to {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The report could not be serialized.
    #[error("cannot serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type alias for report persistence.
pub type Result<T> = std::result::Result<T, MetricsError>;
