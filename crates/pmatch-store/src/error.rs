//! Decision store error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading or writing review decisions.
#[derive(Debug, Error)]
pub enum StoreError {
    /// File I/O error.
    #[error("failed to {operation} decision file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The temp file was written but could not replace the target.
    #[error("failed to replace {target_path} with {temp_path}")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed decision table.
    #[error("failed to parse {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// A status cell holds something other than 0, 1 or 2.
    #[error("invalid status '{value}' on line {line} of {path}")]
    InvalidStatus {
        path: PathBuf,
        line: u64,
        value: String,
    },
}

/// Result type for decision store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
