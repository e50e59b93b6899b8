//! Report building and output.

pub mod builder;
pub mod generator;

pub use builder::{build_report, ReportSettings};
pub use generator::write_report;
