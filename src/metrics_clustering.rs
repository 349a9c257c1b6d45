//! Common metrics for clustering
use crate::dataset::DatasetBase;
use crate::distance::{l2_dist, sq_l2_dist};
use crate::error::{Error, Result};
use crate::Float;
use ndarray::{Array1, ArrayBase, ArrayView1, Axis, Data, Ix1, Ix2, Zip};

/// Evaluates the quality of a clustering using euclidean distance.
pub trait SilhouetteScore<F> {
    /// Evaluates the quality of a clustering.
    ///
    /// Given a clustered dataset,
    /// the silhouette score for each sample is computed as
    /// the relative difference between the average distance
    /// of the sample to other samples in the same cluster and
    /// the minimum average distance of the sample to samples in
    /// another cluster. This value goes from -1 to +1 when the point
    /// is respectively closer (in average) to points in another cluster and to points in its own cluster.
    ///
    /// Finally, the silhouette score for the clustering is evaluated as the mean
    /// silhouette score of each sample.
    fn silhouette_score(&self) -> Result<F>;
}

struct DistanceCount<F> {
    total_distance: F,
    count: usize,
}

impl<F: Float> DistanceCount<F> {
    pub fn new(count: usize) -> DistanceCount<F> {
        DistanceCount {
            total_distance: F::zero(),
            count,
        }
    }

    /// Divides the total distance from the sample to this cluster by the number of samples in the cluster
    pub fn mean_distance(&self) -> F {
        self.total_distance / F::cast(self.count)
    }

    /// To be used in the cluster in which the sample is located. The distance from the sample to itself
    /// is zero so it does not get added to the total distance. We can then just divide the total
    /// distance by #samples in this cluster - 1
    pub fn same_label_mean_distance(&self) -> F {
        if self.count == 1 {
            return F::zero();
        }
        self.total_distance / F::cast(self.count - 1)
    }

    /// adds the distance of `other_sample` from `eval_sample` to the total distance of `eval_sample` from the current cluster
    pub fn add_point(&mut self, eval_sample: ArrayView1<F>, other_sample: ArrayView1<F>) {
        self.total_distance += l2_dist(&eval_sample, &other_sample);
    }
}

/// s(x) = (b(x) - a(x)) / max{a(x), b(x)}, zero when both are zero
fn silhouette_value<F: Float>(a_x: F, b_x: F) -> F {
    let max = if a_x > b_x { a_x } else { b_x };
    if max == F::zero() {
        F::zero()
    } else {
        (b_x - a_x) / max
    }
}

fn cluster_sizes(memberships: &ArrayBase<impl Data<Elem = usize>, Ix1>) -> Vec<usize> {
    let n_clusters = memberships.iter().max().map_or(0, |&m| m + 1);
    let mut sizes = vec![0; n_clusters];
    for &m in memberships {
        sizes[m] += 1;
    }
    sizes
}

/// Per-observation silhouette values
///
/// `memberships[i]` is the cluster id of the i-th row of `records`. Cluster ids do not need to
/// be contiguous: ids without members are skipped when looking for the nearest other cluster.
///
/// Fails with `Error::Parameters` if `memberships` does not have one entry per row and with
/// `Error::NotEnoughClusters` if fewer than two clusters have members, as the silhouette is
/// undefined for a single cluster.
pub fn silhouette_samples<F: Float>(
    records: &ArrayBase<impl Data<Elem = F> + Sync, Ix2>,
    memberships: &ArrayBase<impl Data<Elem = usize> + Sync, Ix1>,
) -> Result<Array1<F>> {
    if records.nrows() != memberships.len() {
        return Err(Error::Parameters(format!(
            "expected {} memberships, got {}",
            records.nrows(),
            memberships.len()
        )));
    }

    let sizes = cluster_sizes(memberships);
    let populated = sizes.iter().filter(|&&size| size > 0).count();
    if populated < 2 {
        return Err(Error::NotEnoughClusters(populated));
    }

    let scores = Zip::from(records.rows())
        .and(memberships)
        .par_map_collect(|sample, &label| {
            let mut clusters: Vec<DistanceCount<F>> =
                sizes.iter().map(|&size| DistanceCount::new(size)).collect();

            // Loops through all samples in the dataset and adds
            // the distance between them and `sample` to the cluster
            // in which they belong
            for (other, &other_label) in records.rows().into_iter().zip(memberships.iter()) {
                clusters[other_label].add_point(sample.view(), other);
            }

            // average distance from `sample` to points in its cluster
            let mut a_x = F::zero();
            // minimum average distance from `sample` to another populated cluster
            let mut b_x: Option<F> = None;

            for (cluster, counter) in clusters.iter().enumerate() {
                if counter.count == 0 {
                    continue;
                }
                if cluster == label {
                    a_x = counter.same_label_mean_distance();
                } else {
                    let mean = counter.mean_distance();
                    b_x = match b_x {
                        Some(v) if v <= mean => Some(v),
                        _ => Some(mean),
                    };
                }
            }

            // at least two clusters are populated, so there is always another cluster
            silhouette_value(a_x, b_x.unwrap_or_else(F::zero))
        });

    Ok(scores)
}

/// Mean silhouette value across all observations
///
/// See [`silhouette_samples`] for the failure modes.
pub fn average_silhouette<F: Float>(
    records: &ArrayBase<impl Data<Elem = F> + Sync, Ix2>,
    memberships: &ArrayBase<impl Data<Elem = usize> + Sync, Ix1>,
) -> Result<F> {
    let scores = silhouette_samples(records, memberships)?;
    Ok(scores.sum() / F::cast(scores.len()))
}

impl<F, D, T> SilhouetteScore<F> for DatasetBase<ArrayBase<D, Ix2>, ArrayBase<T, Ix1>>
where
    F: Float,
    D: Data<Elem = F> + Sync,
    T: Data<Elem = usize> + Sync,
{
    fn silhouette_score(&self) -> Result<F> {
        average_silhouette(self.records(), self.targets())
    }
}

/// Total sum of squares: the dispersion of all records about their grand mean
///
/// Returns zero for an empty table.
pub fn total_ss<F: Float>(records: &ArrayBase<impl Data<Elem = F>, Ix2>) -> F {
    match records.mean_axis(Axis(0)) {
        Some(grand_mean) => records
            .rows()
            .into_iter()
            .map(|row| sq_l2_dist(&row, &grand_mean))
            .sum(),
        None => F::zero(),
    }
}

/// Within-cluster sum of squares of every cluster
///
/// `centroids` has shape `(n_clusters, n_features)`; the i-th entry of the result is the sum of
/// squared distances between the members of cluster i and the i-th centroid.
pub fn within_ss<F: Float>(
    records: &ArrayBase<impl Data<Elem = F>, Ix2>,
    memberships: &ArrayBase<impl Data<Elem = usize>, Ix1>,
    centroids: &ArrayBase<impl Data<Elem = F>, Ix2>,
) -> Array1<F> {
    let mut within = Array1::zeros(centroids.nrows());
    Zip::from(records.rows())
        .and(memberships)
        .for_each(|row, &cluster| {
            within[cluster] += sq_l2_dist(&row, &centroids.row(cluster));
        });
    within
}
