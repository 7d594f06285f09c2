use thiserror::Error;

use pmatch_ingest::IngestError;
use pmatch_model::ModelError;

/// Errors that abort a matching run.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A registry could not be read; the run never sees partial data.
    #[error("registry unavailable: {0}")]
    SourceUnavailable(#[from] IngestError),
    #[error(transparent)]
    Options(#[from] ModelError),
}

pub type Result<T> = std::result::Result<T, CoreError>;
