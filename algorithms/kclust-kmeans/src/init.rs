use crate::algorithm::update_min_dists;
use kclust::Float;
use ndarray::{s, Array1, Array2, ArrayView2, Axis};
use ndarray_rand::rand::distributions::{Distribution, WeightedIndex};
use ndarray_rand::rand::{self, Rng};
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
/// Specifies centroid initialization algorithm for KMeans.
pub enum KMeansInit<F: Float> {
    /// Pick random points as centroids: `n_clusters` distinct observations drawn uniformly,
    /// without replacement.
    Random,
    /// Precomputed list of centroids, represented as an array of (n_centroids, n_features).
    /// Every restart starts from the same centroids, so a single run is enough.
    Precomputed(Array2<F>),
    /// K-means++ algorithm. Using this over random initialization causes K-means to converge
    /// faster for almost all cases, since K-means++ produces better centroids.
    KMeansPlusPlus,
}

impl<F: Float> KMeansInit<F> {
    /// Runs the chosen initialization routine
    pub(crate) fn run<R: Rng>(
        &self,
        n_clusters: usize,
        observations: &ArrayView2<F>,
        rng: &mut R,
    ) -> Array2<F> {
        match self {
            Self::Random => random_init(n_clusters, observations, rng),
            Self::KMeansPlusPlus => k_means_plusplus(n_clusters, observations, rng),
            Self::Precomputed(centroids) => centroids.clone(),
        }
    }
}

/// Pick random points from the input matrix as centroids
fn random_init<F: Float>(
    n_clusters: usize,
    observations: &ArrayView2<F>,
    rng: &mut impl Rng,
) -> Array2<F> {
    let (n_samples, _) = observations.dim();
    let indices = rand::seq::index::sample(rng, n_samples, n_clusters).into_vec();
    observations.select(Axis(0), &indices)
}

/// Selects centroids using the KMeans++ initialization algorithm. The weights determine the
/// likeliness of an input point to be selected as a centroid relative to other points. The higher
/// the weight, the more likely the point will be selected as a centroid.
fn k_means_plusplus<F: Float>(
    n_clusters: usize,
    observations: &ArrayView2<F>,
    rng: &mut impl Rng,
) -> Array2<F> {
    let (n_samples, n_features) = observations.dim();
    let mut centroids = Array2::zeros((n_clusters, n_features));
    let first = rng.gen_range(0..n_samples);
    centroids.row_mut(0).assign(&observations.row(first));

    let mut dists = Array1::zeros(n_samples);
    for c_cnt in 1..n_clusters {
        update_min_dists(&centroids.slice(s![0..c_cnt, ..]), observations, &mut dists);
        // every remaining point coincides with a centroid, any of them will do
        let centroid_idx = match WeightedIndex::new(dists.iter()) {
            Ok(weights) => weights.sample(rng),
            Err(_) => rng.gen_range(0..n_samples),
        };
        centroids
            .row_mut(c_cnt)
            .assign(&observations.row(centroid_idx));
    }
    centroids
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array};
    use ndarray_rand::rand::SeedableRng;
    use ndarray_rand::rand_distr::Uniform;
    use ndarray_rand::RandomExt;
    use rand_xoshiro::Xoshiro256Plus;
    use std::collections::HashSet;

    #[test]
    fn test_precomputed() {
        let mut rng = Xoshiro256Plus::seed_from_u64(40);
        let centroids = array![[0.0, 1.0], [40.0, 10.0]];
        let observations = array![[3.0, 4.0], [1.0, 3.0], [25.0, 15.0]];
        let c = KMeansInit::Precomputed(centroids.clone()).run(
            2,
            &observations.view(),
            &mut rng,
        );
        assert_abs_diff_eq!(c, centroids);
    }

    #[test]
    fn random_init_picks_distinct_observations() {
        let mut rng = Xoshiro256Plus::seed_from_u64(42);
        let observations: Array2<f64> =
            Array::random_using((30, 3), Uniform::new(-10., 10.), &mut rng);

        for _ in 0..20 {
            let centroids = KMeansInit::Random.run(7, &observations.view(), &mut rng);
            assert_eq!(centroids.dim(), (7, 3));

            let mut picked = HashSet::new();
            for centroid in centroids.rows() {
                let idx = observations
                    .rows()
                    .into_iter()
                    .position(|row| row == centroid)
                    .expect("centroid is an observation");
                assert!(picked.insert(idx), "observation {} picked twice", idx);
            }
        }
    }

    #[test]
    fn random_init_uses_every_row_when_k_equals_n() {
        let mut rng = Xoshiro256Plus::seed_from_u64(7);
        let observations = array![[0., 0.], [0., 1.], [10., 10.], [10., 11.]];
        let centroids = KMeansInit::Random.run(4, &observations.view(), &mut rng);
        let mut rows: Vec<_> = centroids.rows().into_iter().map(|r| r.to_vec()).collect();
        rows.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(
            rows,
            vec![
                vec![0., 0.],
                vec![0., 1.],
                vec![10., 10.],
                vec![10., 11.]
            ]
        );
    }

    #[test]
    fn kmeans_plusplus_spreads_centroids() {
        // Two far apart pairs of points: the second centroid must land in the other pair
        let mut rng = Xoshiro256Plus::seed_from_u64(3);
        let observations = array![[0., 0.], [0., 0.1], [1000., 1000.], [1000., 1000.1]];
        for _ in 0..20 {
            let centroids = KMeansInit::KMeansPlusPlus.run(2, &observations.view(), &mut rng);
            let first_low = centroids[[0, 0]] < 500.;
            let second_low = centroids[[1, 0]] < 500.;
            assert_ne!(first_low, second_low);
        }
    }

    #[test]
    fn kmeans_plusplus_with_duplicate_points() {
        let mut rng = Xoshiro256Plus::seed_from_u64(3);
        let observations = Array2::<f64>::ones((5, 2));
        let centroids = KMeansInit::KMeansPlusPlus.run(3, &observations.view(), &mut rng);
        assert_abs_diff_eq!(centroids, Array2::<f64>::ones((3, 2)));
    }
}
