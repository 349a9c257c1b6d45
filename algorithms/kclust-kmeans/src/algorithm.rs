use crate::errors::{KMeansError, KMeansParamsError};
use crate::hyperparams::{KMeansParams, KMeansValidParams};
use kclust::metrics::{total_ss, within_ss};
use kclust::prelude::*;
use kclust::{distance::sq_l2_dist, Float};
use ndarray::{Array1, Array2, ArrayBase, ArrayView2, Axis, Data, DataMut, Ix1, Ix2, Zip};
use ndarray_rand::rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;
use rayon::prelude::*;
use tracing::{debug, info, warn};

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq)]
/// K-means clustering aims to partition a set of unlabeled observations into clusters,
/// where each observation belongs to the cluster with the nearest mean.
///
/// The mean of the points within a cluster is called *centroid*.
///
/// Given the set of centroids, you can assign an observation to a cluster
/// choosing the nearest centroid.
///
/// We provide the _standard algorithm_ (also known as Lloyd's Algorithm). Empty clusters are
/// re-seeded with the observation lying farthest from its own centroid.
///
/// More details on the algorithm can be found in the next section or
/// [here](https://en.wikipedia.org/wiki/K-means_clustering).
///
/// ## Standard algorithm
///
/// K-means is an iterative algorithm: it progressively refines the choice of centroids.
///
/// It's guaranteed to converge, even though it might not find the optimal set of centroids
/// (unfortunately it can get stuck in a local minimum, finding the optimal minimum if NP-hard!).
///
/// There are three steps in the standard algorithm:
/// - initialisation step: pick `n_clusters` distinct observations at random as centroids
///   (or use one of the other [initialisation methods](crate::KMeansInit));
/// - assignment step: assign each observation to the nearest cluster
///   (minimum squared euclidean distance between the observation and the cluster's centroid,
///   the lowest centroid index wins a tie);
/// - update step: recompute the centroid of each cluster.
///
/// The initialisation step is a one-off, done at the very beginning.
/// Update and assignment are repeated in a loop until no observation changes cluster or
/// we exceed the `max_n_iterations`.
///
/// Since the outcome depends on the initial centroids the whole procedure is run `n_runs`
/// times, and the run with the lowest total within-cluster sum of squares is kept. A tie goes
/// to the run started first.
///
/// ## Parallelisation
///
/// Runs do not share any state: each one draws from its own random stream, derived from the
/// seed of the hyperparameters, and they are executed on the `rayon` thread pool. The result
/// does not depend on the number of threads.
///
/// The work performed by the assignment step does not require any coordination either:
/// the closest centroid for each point can be computed independently from the
/// closest centroid for any of the remaining points, so it is parallelised as well.
///
/// ## Tutorial
///
/// ```
/// use kclust::prelude::*;
/// use kclust_kmeans::KMeans;
/// use ndarray::array;
/// use approx::assert_abs_diff_eq;
///
/// let dataset = Dataset::from(array![[0., 0.], [0., 1.], [10., 10.], [10., 11.]]);
///
/// let model = KMeans::params(2)
///     .n_runs(5)
///     .seed(42)
///     .fit(&dataset)
///     .expect("KMeans fitted");
///
/// assert!(model.converged());
/// assert_abs_diff_eq!(model.total_within_ss(), 1.0, epsilon = 1e-12);
///
/// // Both observations of a pair share a cluster
/// let memberships = model.memberships();
/// assert_eq!(memberships[0], memberships[1]);
/// assert_eq!(memberships[2], memberships[3]);
/// assert_ne!(memberships[0], memberships[2]);
///
/// // New observations are assigned to the nearest centroid
/// let cluster: usize = model.predict(&array![9., 12.]);
/// assert_eq!(cluster, memberships[2]);
/// ```
pub struct KMeans<F: Float> {
    centroids: Array2<F>,
    memberships: Array1<usize>,
    cluster_sizes: Array1<usize>,
    within_ss: Array1<F>,
    total_within_ss: F,
    total_ss: F,
    n_iterations: u64,
    converged: bool,
    best_run: usize,
    inertia_trace: Vec<F>,
}

impl<F: Float> KMeans<F> {
    pub fn params(n_clusters: usize) -> KMeansParams<F> {
        KMeansParams::new(n_clusters)
    }

    /// Return the set of centroids as a 2-dimensional matrix with shape
    /// `(n_centroids, n_features)`.
    pub fn centroids(&self) -> &Array2<F> {
        &self.centroids
    }

    /// Return the cluster index of every training observation
    pub fn memberships(&self) -> &Array1<usize> {
        &self.memberships
    }

    /// Return the number of training points belonging to each cluster
    pub fn cluster_sizes(&self) -> &Array1<usize> {
        &self.cluster_sizes
    }

    /// Number of clusters
    pub fn n_clusters(&self) -> usize {
        self.centroids.nrows()
    }

    /// Sum of squared distances between the members of each cluster and its centroid
    pub fn within_ss(&self) -> &Array1<F> {
        &self.within_ss
    }

    /// Sum of the per-cluster within sum of squares, the quantity minimised by k-means
    pub fn total_within_ss(&self) -> F {
        self.total_within_ss
    }

    /// Sum of squared distances between the training points and their grand mean
    pub fn total_ss(&self) -> F {
        self.total_ss
    }

    /// Dispersion explained by the partition, `total_ss - total_within_ss`
    pub fn between_ss(&self) -> F {
        self.total_ss - self.total_within_ss
    }

    /// Number of iterations performed by the winning run
    pub fn n_iterations(&self) -> u64 {
        self.n_iterations
    }

    /// Whether the winning run stopped because the assignment was stable. If `false` the run hit
    /// `max_n_iterations` and the result is the last assignment it computed.
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Index of the run which produced this model
    pub fn best_run(&self) -> usize {
        self.best_run
    }

    /// Total within sum of squares of the winning run, after the initial assignment and
    /// after every iteration
    pub fn inertia_trace(&self) -> &[F] {
        &self.inertia_trace
    }
}

/// Partitions the observations of `dataset` in `k` clusters
///
/// Shorthand for `KMeans::params(k)` with the given number of runs, iteration bound and seed.
pub fn partition<F: Float, D: Data<Elem = F>, T>(
    dataset: &DatasetBase<ArrayBase<D, Ix2>, T>,
    k: usize,
    restarts: usize,
    max_iterations: u64,
    rng_seed: u64,
) -> Result<KMeans<F>, KMeansError> {
    KMeans::params(k)
        .n_runs(restarts)
        .max_n_iterations(max_iterations)
        .seed(rng_seed)
        .fit(dataset)
}

/// The total within-cluster sum of squares of a fitted model, the score plotted by the elbow
/// heuristic
pub fn total_within_ss<F: Float>(model: &KMeans<F>) -> F {
    model.total_within_ss()
}

/// Centroids of one iteration together with the assignment they induce.
///
/// A run never mutates a snapshot: every iteration builds a new one from the previous.
struct Snapshot<F> {
    centroids: Array2<F>,
    memberships: Array1<usize>,
    // squared distance of every observation to its centroid
    dists: Array1<F>,
}

impl<F: Float> Snapshot<F> {
    fn assign(centroids: Array2<F>, observations: &ArrayView2<F>) -> Snapshot<F> {
        let n_samples = observations.nrows();
        let mut memberships = Array1::zeros(n_samples);
        let mut dists = Array1::zeros(n_samples);
        update_memberships_and_dists(&centroids, observations, &mut memberships, &mut dists);

        Snapshot {
            centroids,
            memberships,
            dists,
        }
    }

    fn inertia(&self) -> F {
        self.dists.sum()
    }
}

/// Outcome of a single run
struct Run<F> {
    snapshot: Snapshot<F>,
    n_iterations: u64,
    converged: bool,
    inertia_trace: Vec<F>,
}

fn run_once<F: Float, R: Rng>(
    params: &KMeansValidParams<F>,
    observations: &ArrayView2<F>,
    rng: &mut R,
) -> Run<F> {
    let centroids = params
        .init_method()
        .run(params.n_clusters(), observations, rng);
    let mut snapshot = Snapshot::assign(centroids, observations);
    let mut inertia_trace = vec![snapshot.inertia()];
    let mut n_iterations = 0;
    let mut converged = false;

    while n_iterations < params.max_n_iterations() {
        n_iterations += 1;
        let (centroids, reseeded) = compute_centroids(&snapshot, observations);
        if reseeded {
            debug!(iteration = n_iterations, "re-seeded empty clusters");
        }
        let next = Snapshot::assign(centroids, observations);
        inertia_trace.push(next.inertia());

        // memberships unchanged, a re-seed that wins no observation leaves its cluster empty
        let stable = next.memberships == snapshot.memberships;
        snapshot = next;
        if stable {
            converged = true;
            break;
        }
    }

    Run {
        snapshot,
        n_iterations,
        converged,
        inertia_trace,
    }
}

impl<F: Float, D: Data<Elem = F>, T> Fit<ArrayBase<D, Ix2>, T, KMeansError>
    for KMeansValidParams<F>
{
    type Object = KMeans<F>;

    /// Given an input matrix `observations`, with shape `(n_observations, n_features)`,
    /// `fit` identifies `n_clusters` centroids based on the training data distribution.
    ///
    /// An instance of `KMeans` is returned.
    ///
    fn fit(&self, dataset: &DatasetBase<ArrayBase<D, Ix2>, T>) -> Result<Self::Object, KMeansError> {
        let observations = dataset.records().view();
        let (n_samples, n_features) = observations.dim();
        let n_clusters = self.n_clusters();

        if n_samples == 0 {
            return Err(KMeansError::EmptyDataset);
        }
        if n_features == 0 {
            return Err(KMeansError::NoFeatures);
        }
        if n_samples < n_clusters {
            return Err(KMeansError::NotEnoughSamples {
                n_samples,
                n_clusters,
            });
        }
        if let crate::KMeansInit::Precomputed(centroids) = self.init_method() {
            if centroids.ncols() != n_features {
                return Err(KMeansError::FeatureMismatch {
                    expected: n_features,
                    found: centroids.ncols(),
                });
            }
        }
        if observations.iter().any(|x| !x.is_finite()) {
            return Err(kclust::error::Error::NonFinite.into());
        }

        // One independent stream per run, so that the outcome does not depend on scheduling
        let mut rng = Xoshiro256Plus::seed_from_u64(self.seed());
        let streams: Vec<Xoshiro256Plus> = (0..self.n_runs())
            .map(|_| {
                let stream = rng.clone();
                rng.jump();
                stream
            })
            .collect();

        let runs: Vec<Run<F>> = streams
            .into_par_iter()
            .enumerate()
            .map(|(run, mut rng)| {
                let outcome = run_once(self, &observations, &mut rng);
                debug!(
                    run,
                    n_iterations = outcome.n_iterations,
                    converged = outcome.converged,
                    inertia = %outcome.snapshot.inertia(),
                    "k-means run finished"
                );
                outcome
            })
            .collect();

        // We keep the centroids which minimize the inertia (defined as the sum of
        // the squared distances of the closest centroid for all observations)
        // over the n runs of the KMeans algorithm.
        let (best_run, best) = runs
            .into_iter()
            .enumerate()
            .reduce(|best, candidate| {
                if candidate.1.snapshot.inertia() < best.1.snapshot.inertia() {
                    candidate
                } else {
                    best
                }
            })
            .ok_or(KMeansParamsError::NRuns)?;

        if !best.converged {
            warn!(
                n_clusters,
                max_n_iterations = self.max_n_iterations(),
                "k-means did not converge, returning the last assignment"
            );
        }

        let Run {
            snapshot:
                Snapshot {
                    centroids,
                    memberships,
                    ..
                },
            n_iterations,
            converged,
            inertia_trace,
        } = best;

        let within = within_ss(&observations, &memberships, &centroids);
        let total_within = within.sum();
        let total = total_ss(&observations);

        let mut cluster_sizes: Array1<usize> = Array1::zeros(n_clusters);
        memberships.iter().for_each(|&c| cluster_sizes[c] += 1);

        info!(
            n_clusters,
            best_run,
            n_iterations,
            total_within_ss = %total_within,
            "k-means fitted"
        );

        Ok(KMeans {
            centroids,
            memberships,
            cluster_sizes,
            within_ss: within,
            total_within_ss: total_within,
            total_ss: total,
            n_iterations,
            converged,
            best_run,
            inertia_trace,
        })
    }
}

impl<F: Float, DA: Data<Elem = F>> Transformer<&ArrayBase<DA, Ix2>, Array1<F>> for KMeans<F> {
    /// Given an input matrix `observations`, with shape `(n_observations, n_features)`,
    /// `transform` returns, for each observation, its squared distance to its centroid.
    fn transform(&self, observations: &ArrayBase<DA, Ix2>) -> Array1<F> {
        let mut dists = Array1::zeros(observations.nrows());
        update_min_dists(&self.centroids, &observations.view(), &mut dists);
        dists
    }
}

impl<F: Float, DA: Data<Elem = F>> PredictInplace<ArrayBase<DA, Ix2>, Array1<usize>>
    for KMeans<F>
{
    /// Given an input matrix `observations`, with shape `(n_observations, n_features)`,
    /// `predict` returns, for each observation, the index of the closest cluster/centroid.
    ///
    /// You can retrieve the centroid associated to an index using the
    /// [`centroids` method](#method.centroids).
    fn predict_inplace(&self, observations: &ArrayBase<DA, Ix2>, memberships: &mut Array1<usize>) {
        assert_eq!(
            observations.nrows(),
            memberships.len(),
            "The number of data points must match the number of memberships."
        );

        update_cluster_memberships(&self.centroids, &observations.view(), memberships);
    }

    fn default_target(&self, x: &ArrayBase<DA, Ix2>) -> Array1<usize> {
        Array1::zeros(x.nrows())
    }
}

impl<F: Float, DA: Data<Elem = F>> PredictInplace<ArrayBase<DA, Ix1>, usize> for KMeans<F> {
    /// Given one input observation, return the index of its closest cluster
    ///
    /// You can retrieve the centroid associated to an index using the
    /// [`centroids` method](#method.centroids).
    fn predict_inplace(&self, observation: &ArrayBase<DA, Ix1>, membership: &mut usize) {
        *membership = closest_centroid(&self.centroids, observation).0;
    }

    fn default_target(&self, _x: &ArrayBase<DA, Ix1>) -> usize {
        0
    }
}

/// K-means is an iterative algorithm.
/// We will perform the update and assignment steps until we are satisfied
/// (according to our convergence criteria).
///
/// `compute_centroids` returns a 2-dimensional array,
/// where the i-th row corresponds to the i-th cluster, and whether any empty cluster had to be
/// re-seeded.
///
/// An empty cluster takes the observation farthest from its own centroid (lowest index on ties).
/// An observation re-seeds at most one cluster per update.
fn compute_centroids<F: Float>(
    snapshot: &Snapshot<F>,
    // (n_observations, n_features)
    observations: &ArrayBase<impl Data<Elem = F>, Ix2>,
) -> (Array2<F>, bool) {
    let n_clusters = snapshot.centroids.nrows();
    let mut counts: Array1<usize> = Array1::zeros(n_clusters);
    let mut centroids = Array2::zeros((n_clusters, observations.ncols()));

    Zip::from(observations.rows())
        .and(&snapshot.memberships)
        .for_each(|observation, &cluster_membership| {
            let mut centroid = centroids.row_mut(cluster_membership);
            centroid += &observation;
            counts[cluster_membership] += 1;
        });

    let mut dists = snapshot.dists.clone();
    let mut reseeded = false;
    for (mut centroid, &cnt) in centroids.rows_mut().into_iter().zip(counts.iter()) {
        if cnt > 0 {
            centroid /= F::cast(cnt);
        } else {
            let farthest = farthest_observation(&dists);
            centroid.assign(&observations.row(farthest));
            dists[farthest] = F::neg_infinity();
            reseeded = true;
        }
    }

    (centroids, reseeded)
}

fn farthest_observation<F: Float>(dists: &Array1<F>) -> usize {
    let mut farthest = 0;
    for (idx, dist) in dists.iter().enumerate() {
        if *dist > dists[farthest] {
            farthest = idx;
        }
    }
    farthest
}

// Update `cluster_memberships` with the index of the cluster each observation belongs to.
pub(crate) fn update_cluster_memberships<F: Float>(
    centroids: &ArrayBase<impl Data<Elem = F> + Sync, Ix2>,
    observations: &ArrayBase<impl Data<Elem = F> + Sync, Ix2>,
    cluster_memberships: &mut ArrayBase<impl DataMut<Elem = usize>, Ix1>,
) {
    Zip::from(observations.axis_iter(Axis(0)))
        .and(cluster_memberships)
        .par_for_each(|observation, cluster_membership| {
            *cluster_membership = closest_centroid(centroids, &observation).0
        });
}

// Updates `dists` with the distance of each observation from its closest centroid.
pub(crate) fn update_min_dists<F: Float>(
    centroids: &ArrayBase<impl Data<Elem = F> + Sync, Ix2>,
    observations: &ArrayBase<impl Data<Elem = F> + Sync, Ix2>,
    dists: &mut ArrayBase<impl DataMut<Elem = F>, Ix1>,
) {
    Zip::from(observations.axis_iter(Axis(0)))
        .and(dists)
        .par_for_each(|observation, dist| *dist = closest_centroid(centroids, &observation).1);
}

// Efficient combination of `update_cluster_memberships` and `update_min_dists`.
pub(crate) fn update_memberships_and_dists<F: Float>(
    centroids: &ArrayBase<impl Data<Elem = F> + Sync, Ix2>,
    observations: &ArrayBase<impl Data<Elem = F> + Sync, Ix2>,
    cluster_memberships: &mut ArrayBase<impl DataMut<Elem = usize>, Ix1>,
    dists: &mut ArrayBase<impl DataMut<Elem = F>, Ix1>,
) {
    Zip::from(observations.axis_iter(Axis(0)))
        .and(cluster_memberships)
        .and(dists)
        .par_for_each(|observation, cluster_membership, dist| {
            let (m, d) = closest_centroid(centroids, &observation);
            *cluster_membership = m;
            *dist = d;
        });
}

/// Given a matrix of centroids with shape (n_centroids, n_features) and an observation,
/// return the index of the closest centroid (the index of the corresponding row in `centroids`)
/// and the squared distance to it. The lowest index wins a tie.
pub(crate) fn closest_centroid<F: Float>(
    // (n_centroids, n_features)
    centroids: &ArrayBase<impl Data<Elem = F>, Ix2>,
    // (n_features)
    observation: &ArrayBase<impl Data<Elem = F>, Ix1>,
) -> (usize, F) {
    let iterator = centroids.rows().into_iter();

    let first_centroid = centroids.row(0);
    let (mut closest_index, mut minimum_distance) = (0, sq_l2_dist(&first_centroid, observation));

    for (centroid_index, centroid) in iterator.enumerate().skip(1) {
        let distance = sq_l2_dist(&centroid, observation);
        if distance < minimum_distance {
            closest_index = centroid_index;
            minimum_distance = distance;
        }
    }
    (closest_index, minimum_distance)
}
