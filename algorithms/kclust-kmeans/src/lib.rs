//! `kclust-kmeans` partitions the rows of a table with Lloyd's k-means and helps choosing the
//! number of clusters.
//!
//! ## The big picture
//!
//! `kclust-kmeans` builds on the [`kclust`] core: records come in a [`kclust::Dataset`],
//! hyperparameters are checked through [`kclust::ParamGuard`] and fitted models implement the
//! `Predict` and `Transformer` traits.
//!
//! ## Current state
//!
//! * [K-Means](KMeans), with seeded parallel restarts and a choice of
//!   [initialisation](KMeansInit)
//! * [a cluster-count advisor](Advisor), scoring a range of candidate `k` by
//!   [total within-cluster sum of squares or average silhouette width](ClusterMetric)
//!
//! Implementation choices, algorithmic details and tutorials can be found in the page dedicated
//! to the specific algorithms.
mod advisor;
#[allow(clippy::new_ret_no_self)]
mod algorithm;
mod errors;
mod hyperparams;
mod init;

pub use advisor::*;
pub use algorithm::{partition, total_within_ss, KMeans};
pub use errors::*;
pub use hyperparams::*;
pub use init::*;
