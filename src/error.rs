//! Error handling for the statement analyzer
//!
//! Defines the typed failure conditions callers match on and establishes a
//! unified Result type using anyhow for context chaining and propagation.

use thiserror::Error;

/// Hard failure conditions for statement analysis
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("statement header row not found")]
    HeaderNotFound,

    #[error("no valuation snapshots to analyze")]
    EmptySnapshots,

    #[error("invalid date range: {0}")]
    InvalidDateRange(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("io error")]
    Io(#[from] std::io::Error),
}

/// Result type alias for analyzer operations
pub type Result<T> = anyhow::Result<T>;
