//! Euclidean distances between observations
//!
//! The partitioner works on squared euclidean distances (they preserve the ordering and avoid a
//! square root per comparison), while the silhouette score and the distance matrix report plain
//! euclidean distances.
use crate::Float;
use ndarray::{Array2, ArrayBase, Data, Ix1, Ix2, Zip};

/// Squared euclidean distance between two points of equal dimension
pub fn sq_l2_dist<F: Float>(
    a: &ArrayBase<impl Data<Elem = F>, Ix1>,
    b: &ArrayBase<impl Data<Elem = F>, Ix1>,
) -> F {
    debug_assert_eq!(a.len(), b.len());

    Zip::from(a).and(b).fold(F::zero(), |acc, &a, &b| {
        let diff = a - b;
        acc + diff * diff
    })
}

/// Euclidean distance between two points of equal dimension
pub fn l2_dist<F: Float>(
    a: &ArrayBase<impl Data<Elem = F>, Ix1>,
    b: &ArrayBase<impl Data<Elem = F>, Ix1>,
) -> F {
    sq_l2_dist(a, b).sqrt()
}

/// Pairwise euclidean distance matrix
///
/// Given records with shape `(n_observations, n_features)` this returns a symmetric matrix with
/// shape `(n_observations, n_observations)` and a zero diagonal. Inspecting it (e.g. as a
/// heatmap) is a quick way to see whether a standardized table has any cluster structure at all.
pub fn pairwise_distances<F: Float>(records: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Array2<F> {
    let n_samples = records.nrows();
    let mut distances = Array2::zeros((n_samples, n_samples));

    for i in 0..n_samples {
        for j in (i + 1)..n_samples {
            let dist = l2_dist(&records.row(i), &records.row(j));
            distances[[i, j]] = dist;
            distances[[j, i]] = dist;
        }
    }

    distances
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{arr1, array};

    #[test]
    fn l2_dist_of_known_points() {
        let a = arr1(&[0.5, 6.6]);
        let b = arr1(&[4.4, 3.0]);
        assert_abs_diff_eq!(l2_dist(&a, &b), 5.3075, epsilon = 1e-3);
        assert_abs_diff_eq!(sq_l2_dist(&a, &b), 28.17, epsilon = 1e-3);
        assert_abs_diff_eq!(sq_l2_dist(&a, &a), 0.0);
    }

    #[test]
    fn distance_matrix_is_symmetric_with_zero_diagonal() {
        let records = array![[0., 0.], [3., 4.], [6., 8.]];
        let distances = pairwise_distances(&records);

        assert_abs_diff_eq!(
            distances,
            array![[0., 5., 10.], [5., 0., 5.], [10., 5., 0.]],
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(distances, distances.t(), epsilon = 1e-12);
    }

    #[test]
    fn distance_matrix_of_single_row() {
        let distances = pairwise_distances(&array![[1f32, 2., 3.]]);
        assert_eq!(distances.dim(), (1, 1));
        assert_abs_diff_eq!(distances[[0, 0]], 0.0);
    }
}
