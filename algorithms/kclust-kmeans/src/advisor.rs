use crate::errors::{KMeansError, KMeansParamsError};
use crate::KMeans;
use kclust::metrics::average_silhouette;
use kclust::prelude::*;
use kclust::Float;
use ndarray::{ArrayBase, Data, Ix2};
use rayon::prelude::*;
use std::fmt;
use std::ops::RangeInclusive;
use tracing::info;

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

/// Score computed for every candidate cluster count
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClusterMetric {
    /// Total within-cluster sum of squares. Always decreases with `k`, look for the bend ("elbow").
    WithinSs,
    /// Average silhouette width. Look for the peak.
    Silhouette,
}

impl ClusterMetric {
    /// Smallest cluster count for which the metric is defined
    pub fn min_clusters(&self) -> usize {
        match self {
            ClusterMetric::WithinSs => 1,
            ClusterMetric::Silhouette => 2,
        }
    }
}

impl Default for ClusterMetric {
    fn default() -> Self {
        ClusterMetric::WithinSs
    }
}

impl fmt::Display for ClusterMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClusterMetric::WithinSs => write!(f, "total within-cluster sum of squares"),
            ClusterMetric::Silhouette => write!(f, "average silhouette width"),
        }
    }
}

/// One score per candidate cluster count, in ascending order of `k`
///
/// The series is raw material for a human decision: no elbow or peak is picked here.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq)]
pub struct ScoreSeries<F> {
    metric: ClusterMetric,
    scores: Vec<(usize, F)>,
}

impl<F: Float> ScoreSeries<F> {
    /// The metric the scores were computed with
    pub fn metric(&self) -> ClusterMetric {
        self.metric
    }

    /// Iterate over `(k, score)` pairs in ascending `k`
    pub fn iter(&self) -> impl Iterator<Item = &(usize, F)> {
        self.scores.iter()
    }

    /// Candidate cluster counts
    pub fn ks(&self) -> Vec<usize> {
        self.scores.iter().map(|(k, _)| *k).collect()
    }

    /// Scores, in the order of [`ks`](ScoreSeries::ks)
    pub fn scores(&self) -> Vec<F> {
        self.scores.iter().map(|(_, score)| *score).collect()
    }

    /// Score of a given cluster count, if it was a candidate
    pub fn get(&self, k: usize) -> Option<F> {
        self.scores
            .iter()
            .find(|(candidate, _)| *candidate == k)
            .map(|(_, score)| *score)
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

impl<'a, F> IntoIterator for &'a ScoreSeries<F> {
    type Item = &'a (usize, F);
    type IntoIter = std::slice::Iter<'a, (usize, F)>;

    fn into_iter(self) -> Self::IntoIter {
        self.scores.iter()
    }
}

/// Runs k-means for a range of candidate cluster counts and scores each partition
///
/// ```
/// use kclust::prelude::*;
/// use kclust_kmeans::{Advisor, ClusterMetric};
/// use ndarray::array;
///
/// let dataset = Dataset::from(array![[0., 0.], [0., 1.], [10., 10.], [10., 11.]]);
///
/// let series = Advisor::params(1..=4)
///     .metric(ClusterMetric::WithinSs)
///     .n_runs(5)
///     .advise(&dataset)
///     .unwrap();
///
/// assert_eq!(series.ks(), vec![1, 2, 3, 4]);
/// // the bend is at k = 2
/// assert!(series.get(1).unwrap() > 100. * series.get(2).unwrap());
/// ```
pub struct Advisor;

impl Advisor {
    pub fn params(k_range: RangeInclusive<usize>) -> AdvisorParams {
        AdvisorParams::new(k_range)
    }
}

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq)]
/// Validated hyperparameters of the [cluster-count advisor](Advisor)
///
/// Every candidate is fitted with the same number of runs, iteration bound and seed, and with
/// random initialisation.
pub struct AdvisorValidParams {
    k_range: RangeInclusive<usize>,
    metric: ClusterMetric,
    n_runs: usize,
    max_n_iterations: u64,
    seed: u64,
}

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq)]
/// Builder for [`AdvisorValidParams`]
pub struct AdvisorParams(AdvisorValidParams);

impl AdvisorParams {
    /// Candidates are the cluster counts of `k_range`, scored by total within-cluster sum of
    /// squares.
    ///
    /// Defaults mirror the ones of [`KMeansParams`](crate::KMeansParams):
    /// * `n_runs = 10`
    /// * `max_n_iterations = 300`
    /// * `seed = 42`
    pub fn new(k_range: RangeInclusive<usize>) -> Self {
        Self(AdvisorValidParams {
            k_range,
            metric: ClusterMetric::WithinSs,
            n_runs: 10,
            max_n_iterations: 300,
            seed: 42,
        })
    }

    pub fn metric(mut self, metric: ClusterMetric) -> Self {
        self.0.metric = metric;
        self
    }

    pub fn n_runs(mut self, n_runs: usize) -> Self {
        self.0.n_runs = n_runs;
        self
    }

    pub fn max_n_iterations(mut self, max_n_iterations: u64) -> Self {
        self.0.max_n_iterations = max_n_iterations;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.0.seed = seed;
        self
    }

    /// Checks the hyperparameters, then scores every candidate on `dataset`
    pub fn advise<F: Float, D: Data<Elem = F>, T>(
        &self,
        dataset: &DatasetBase<ArrayBase<D, Ix2>, T>,
    ) -> Result<ScoreSeries<F>, KMeansError> {
        self.check_ref()?.advise(dataset)
    }
}

impl ParamGuard for AdvisorParams {
    type Checked = AdvisorValidParams;
    type Error = KMeansParamsError;

    fn check_ref(&self) -> Result<&Self::Checked, Self::Error> {
        let min = self.0.metric.min_clusters();
        if self.0.k_range.is_empty() {
            Err(KMeansParamsError::EmptyRange)
        } else if *self.0.k_range.start() < min {
            Err(KMeansParamsError::RangeStart {
                start: *self.0.k_range.start(),
                min,
            })
        } else if self.0.n_runs == 0 {
            Err(KMeansParamsError::NRuns)
        } else if self.0.max_n_iterations == 0 {
            Err(KMeansParamsError::MaxIterations)
        } else {
            Ok(&self.0)
        }
    }

    fn check(self) -> Result<Self::Checked, Self::Error> {
        self.check_ref()?;
        Ok(self.0)
    }
}

impl AdvisorValidParams {
    pub fn k_range(&self) -> &RangeInclusive<usize> {
        &self.k_range
    }

    pub fn metric(&self) -> ClusterMetric {
        self.metric
    }

    pub fn n_runs(&self) -> usize {
        self.n_runs
    }

    pub fn max_n_iterations(&self) -> u64 {
        self.max_n_iterations
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Fits k-means once per candidate cluster count and scores the partition.
    ///
    /// Candidates are fitted in parallel, the series is ordered by `k`. Fails if the largest
    /// candidate exceeds the number of observations, or with the first error of a candidate.
    pub fn advise<F: Float, D: Data<Elem = F>, T>(
        &self,
        dataset: &DatasetBase<ArrayBase<D, Ix2>, T>,
    ) -> Result<ScoreSeries<F>, KMeansError> {
        let records = dataset.records().view();
        let n_samples = records.nrows();
        if n_samples == 0 {
            return Err(KMeansError::EmptyDataset);
        }
        let end = *self.k_range.end();
        if end > n_samples {
            return Err(KMeansError::RangeEnd { end, n_samples });
        }

        let observations = DatasetBase::new(records, ());
        let scores = self
            .k_range
            .clone()
            .into_par_iter()
            .map(|k| -> Result<(usize, F), KMeansError> {
                let model = KMeans::params(k)
                    .n_runs(self.n_runs)
                    .max_n_iterations(self.max_n_iterations)
                    .seed(self.seed)
                    .fit(&observations)?;

                let score = match self.metric {
                    ClusterMetric::WithinSs => model.total_within_ss(),
                    ClusterMetric::Silhouette => {
                        average_silhouette(observations.records(), model.memberships())?
                    }
                };
                info!(k, metric = %self.metric, score = %score, "scored candidate cluster count");

                Ok((k, score))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ScoreSeries {
            metric: self.metric,
            scores,
        })
    }
}

/// Scores every cluster count of `k_range` on `dataset`
///
/// Each candidate is partitioned with `restarts` runs of at most `max_iterations` iterations,
/// seeded by `rng_seed`, then scored with `metric`.
pub fn advise<F: Float, D: Data<Elem = F>, T>(
    dataset: &DatasetBase<ArrayBase<D, Ix2>, T>,
    k_range: RangeInclusive<usize>,
    restarts: usize,
    max_iterations: u64,
    rng_seed: u64,
    metric: ClusterMetric,
) -> Result<ScoreSeries<F>, KMeansError> {
    Advisor::params(k_range)
        .metric(metric)
        .n_runs(restarts)
        .max_n_iterations(max_iterations)
        .seed(rng_seed)
        .advise(dataset)
}
