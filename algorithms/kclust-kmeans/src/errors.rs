use thiserror::Error;

/// An error when fitting with an invalid hyperparameter
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KMeansParamsError {
    #[error("n_clusters cannot be 0")]
    NClusters,
    #[error("n_runs cannot be 0")]
    NRuns,
    #[error("max_n_iterations cannot be 0")]
    MaxIterations,
    #[error("precomputed centroids have {found} rows, expected n_clusters = {expected}")]
    InitShape { expected: usize, found: usize },
    #[error("the range of candidate cluster counts is empty")]
    EmptyRange,
    #[error("the range of candidate cluster counts starts at {start}, the metric needs at least {min}")]
    RangeStart { start: usize, min: usize },
}

/// An error when modeling a KMeans algorithm
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KMeansError {
    /// When any of the hyperparameters are set the wrong value
    #[error("Invalid hyperparameter: {0}")]
    InvalidParams(#[from] KMeansParamsError),
    /// When the dataset has no observations
    #[error("Fitting failed: the dataset has no observations")]
    EmptyDataset,
    /// When the observations have no features
    #[error("Fitting failed: the observations have no features")]
    NoFeatures,
    /// When there are fewer observations than requested clusters
    #[error("Fitting failed: cannot find {n_clusters} clusters in {n_samples} observations")]
    NotEnoughSamples { n_samples: usize, n_clusters: usize },
    /// When precomputed centroids do not live in the space of the observations
    #[error("Fitting failed: centroids have {found} features, observations have {expected}")]
    FeatureMismatch { expected: usize, found: usize },
    /// When the largest candidate cluster count exceeds the number of observations
    #[error("Invalid range: largest candidate is {end}, but there are only {n_samples} observations")]
    RangeEnd { end: usize, n_samples: usize },
    #[error(transparent)]
    CoreError(#[from] kclust::error::Error),
}
