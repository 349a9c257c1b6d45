//! Error types in kclust
//!

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("invalid parameter {0}")]
    Parameters(String),
    #[error("not enough samples")]
    NotEnoughSamples,
    #[error("at least two populated clusters are required, found {0}")]
    NotEnoughClusters(usize),
    #[error("records contain non-finite values")]
    NonFinite,
}
