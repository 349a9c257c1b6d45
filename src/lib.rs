//! `kclust` partitions the rows of a small numeric table into `k` groups and helps choosing `k`.
//!
//! ## The big picture
//!
//! The workflow is the classic one taught for exploratory clustering:
//!
//! * standardize the table (see `kclust-preprocessing`), so that no feature dominates the
//!   euclidean distance just because of its unit;
//! * look at the [pairwise distance matrix](distance::pairwise_distances);
//! * run k-means for a range of candidate `k` and inspect the total within-cluster sum of squares
//!   ("elbow") or the [average silhouette width](metrics::average_silhouette);
//! * run k-means one last time with the chosen `k` and report the assignment.
//!
//! This crate holds what every step shares: the [`Dataset`] container, the error type, the
//! hyperparameter guard, distances and clustering metrics. The k-means algorithm and the
//! cluster-count advisor live in `kclust-kmeans`.
//!

pub mod dataset;
pub mod distance;
pub mod error;
mod metrics_clustering;
mod param_guard;
pub mod prelude;
pub mod traits;

pub use dataset::{Dataset, DatasetBase, DatasetView, Float};
pub use param_guard::ParamGuard;

/// Common metrics functions for clustering
pub mod metrics {
    pub use crate::metrics_clustering::{
        average_silhouette, silhouette_samples, total_ss, within_ss, SilhouetteScore,
    };
}
