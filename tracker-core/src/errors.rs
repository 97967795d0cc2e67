//! Error types for the tracker core.
//!
//! Not-found on update/delete is reported as [`crate::store::Outcome::NotFound`].

use std::path::PathBuf;

use thiserror::Error;

/// Rejected user input. Raised before the store is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid status: {0:?} (expected Not Started, In Progress or Completed)")]
    InvalidStatus(String),
}

/// Errors from loading or saving the project table.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("table format error: {0}")]
    Csv(#[from] csv::Error),

    #[error("workbook read error: {0}")]
    XlsxRead(#[from] calamine::XlsxError),

    #[error("workbook write error: {0}")]
    XlsxWrite(#[from] rust_xlsxwriter::XlsxError),

    #[error("table has no {0:?} column")]
    MissingColumn(&'static str),

    #[error("row {row}: invalid {column} value {value:?}")]
    InvalidCell {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("table already exists: {}", path.display())]
    AlreadyExists { path: PathBuf },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Errors from loading `tracker.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
