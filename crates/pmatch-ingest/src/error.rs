//! Error types for registry ingestion.

use std::path::PathBuf;
use thiserror::Error;

use pmatch_model::RegistryKind;

/// Errors that can occur while loading a registry.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Registry file not found.
    #[error("{kind} registry not found: {path}")]
    FileNotFound { kind: RegistryKind, path: PathBuf },

    /// Failed to read file.
    #[error("failed to read {kind} registry {path}: {source}")]
    FileRead {
        kind: RegistryKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed CSV (bad quoting, invalid UTF-8).
    #[error("failed to parse {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// File has no header row.
    #[error("registry file is empty: {path}")]
    EmptyCsv { path: PathBuf },

    /// Header lacks the registry's identifier column.
    #[error("required column '{column}' not found in {path}")]
    MissingColumn { column: String, path: PathBuf },
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
