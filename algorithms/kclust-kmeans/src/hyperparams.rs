use crate::KMeansParamsError;

use super::init::KMeansInit;
use kclust::prelude::*;
use kclust::Float;
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq)]
/// The set of hyperparameters that can be specified for the execution of
/// the [K-means algorithm](crate::KMeans).
pub struct KMeansValidParams<F: Float> {
    /// Number of time the k-means algorithm will be run with different centroid seeds.
    n_runs: usize,
    /// We exit the training loop when the number of training iterations
    /// exceeds `max_n_iterations` even if no assignment has stabilised.
    max_n_iterations: u64,
    /// The number of clusters we will be looking for in the training dataset.
    n_clusters: usize,
    /// The initialization strategy used to initialize the centroids.
    init: KMeansInit<F>,
    /// Seed of the random number generator. Every run draws from its own stream derived
    /// from this seed.
    seed: u64,
}

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq)]
/// An helper struct used to construct a set of [valid hyperparameters](KMeansValidParams) for
/// the [K-means algorithm](crate::KMeans) (using the builder pattern).
pub struct KMeansParams<F: Float>(KMeansValidParams<F>);

impl<F: Float> KMeansParams<F> {
    /// `new` lets us configure our training algorithm parameters:
    /// * we will be looking for `n_clusters` in the training dataset;
    /// * we exit the training loop when no observation changes cluster or when the number of
    ///   training iterations exceeds `max_n_iterations`;
    /// * As KMeans convergence depends on centroids initialization
    ///   we run the algorithm `n_runs` times and we keep the best outputs
    ///   in terms of inertia, the one which minimizes the sum of squared
    ///   euclidean distances to the closest centroid for all observations.
    ///
    /// Defaults are provided if optional parameters are not specified:
    /// * `max_n_iterations = 300`
    /// * `n_runs = 10`
    /// * `init = Random`
    /// * `seed = 42`
    pub fn new(n_clusters: usize) -> Self {
        Self(KMeansValidParams {
            n_runs: 10,
            max_n_iterations: 300,
            n_clusters,
            init: KMeansInit::Random,
            seed: 42,
        })
    }

    /// Change the value of `n_runs`
    pub fn n_runs(mut self, n_runs: usize) -> Self {
        self.0.n_runs = n_runs;
        self
    }

    /// Change the value of `max_n_iterations`
    pub fn max_n_iterations(mut self, max_n_iterations: u64) -> Self {
        self.0.max_n_iterations = max_n_iterations;
        self
    }

    /// Change the value of `init`
    pub fn init_method(mut self, init: KMeansInit<F>) -> Self {
        self.0.init = init;
        self
    }

    /// Change the seed of the random number generator
    pub fn seed(mut self, seed: u64) -> Self {
        self.0.seed = seed;
        self
    }
}

impl<F: Float> ParamGuard for KMeansParams<F> {
    type Checked = KMeansValidParams<F>;
    type Error = KMeansParamsError;

    fn check_ref(&self) -> Result<&Self::Checked, Self::Error> {
        if self.0.n_clusters == 0 {
            Err(KMeansParamsError::NClusters)
        } else if self.0.n_runs == 0 {
            Err(KMeansParamsError::NRuns)
        } else if self.0.max_n_iterations == 0 {
            Err(KMeansParamsError::MaxIterations)
        } else if let KMeansInit::Precomputed(centroids) = &self.0.init {
            if centroids.nrows() != self.0.n_clusters {
                Err(KMeansParamsError::InitShape {
                    expected: self.0.n_clusters,
                    found: centroids.nrows(),
                })
            } else {
                Ok(&self.0)
            }
        } else {
            Ok(&self.0)
        }
    }

    fn check(self) -> Result<Self::Checked, Self::Error> {
        self.check_ref()?;
        Ok(self.0)
    }
}

impl<F: Float> KMeansValidParams<F> {
    /// The final results will be the best output of n_runs consecutive runs in terms of inertia.
    pub fn n_runs(&self) -> usize {
        self.n_runs
    }

    /// We exit the training loop when the number of training iterations
    /// exceeds `max_n_iterations` even if the assignment has not stabilised.
    pub fn max_n_iterations(&self) -> u64 {
        self.max_n_iterations
    }

    /// The number of clusters we will be looking for in the training dataset.
    pub fn n_clusters(&self) -> usize {
        self.n_clusters
    }

    /// Cluster initialization strategy
    pub fn init_method(&self) -> &KMeansInit<F> {
        &self.init
    }

    /// Seed of the random number generator
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

#[cfg(test)]
mod tests {
    use crate::{KMeans, KMeansInit, KMeansParams, KMeansParamsError, KMeansValidParams};
    use kclust::ParamGuard;
    use ndarray::array;

    #[test]
    fn autotraits() {
        fn has_autotraits<T: Send + Sync + Sized + Unpin>() {}
        has_autotraits::<KMeansParams<f64>>();
        has_autotraits::<KMeansValidParams<f64>>();
    }

    #[test]
    fn n_clusters_cannot_be_zero() {
        let res = KMeans::<f32>::params(0).check();
        assert!(matches!(res, Err(KMeansParamsError::NClusters)))
    }

    #[test]
    fn max_n_iterations_cannot_be_zero() {
        let res = KMeans::<f64>::params(1).max_n_iterations(0).check();
        assert!(matches!(res, Err(KMeansParamsError::MaxIterations)))
    }

    #[test]
    fn n_runs_cannot_be_zero() {
        let res = KMeans::<f64>::params(1).n_runs(0).check();
        assert!(matches!(res, Err(KMeansParamsError::NRuns)))
    }

    #[test]
    fn precomputed_centroids_must_match_n_clusters() {
        let res = KMeans::params(3)
            .init_method(KMeansInit::Precomputed(array![[0., 0.], [1., 1.]]))
            .check();
        assert_eq!(
            res.unwrap_err(),
            KMeansParamsError::InitShape {
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn defaults() {
        let params = KMeans::<f64>::params(4).check_unwrap();
        assert_eq!(params.n_clusters(), 4);
        assert_eq!(params.n_runs(), 10);
        assert_eq!(params.max_n_iterations(), 300);
        assert_eq!(params.seed(), 42);
        assert_eq!(params.init_method(), &KMeansInit::Random);
    }
}
