//! Error definitions for preprocessing
use thiserror::Error;
pub type Result<T> = std::result::Result<T, PreprocessingError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PreprocessingError {
    #[error("not enough samples")]
    NotEnoughSamples,
    #[error("delta degrees of freedom must lie in [0, n_samples), got {0}")]
    InvalidDdof(String),
    #[error(transparent)]
    CoreError(#[from] kclust::error::Error),
}
