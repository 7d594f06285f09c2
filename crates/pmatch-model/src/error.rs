use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid match options: {0}")]
    InvalidOptions(String),
    #[error("unknown match status code '{0}'")]
    UnknownStatus(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
