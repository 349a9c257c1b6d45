//! Provide traits for different classes of algorithms
//!

use crate::dataset::{DatasetBase, Records};

/// Transformation algorithms
///
/// A transformer takes a dataset and transforms it into a different one. It has no concept of
/// state and provides therefore no method to predict new data. A typical example are kernel
/// methods.
///
/// It should be implemented for all algorithms, also for those which can be fitted.
///
pub trait Transformer<R, T> {
    fn transform(&self, x: R) -> T;
}

/// Fittable algorithms
///
/// A fittable algorithm takes a dataset and creates a concept of some kind about it. For example
/// in *KMeans* this would be the mean values for each class cluster.
///
/// The returned object should implement `PredictInplace` so that it can be used to assign new
/// observations.
pub trait Fit<R, T, E: std::error::Error + From<crate::error::Error>> {
    type Object;

    fn fit(&self, dataset: &DatasetBase<R, T>) -> Result<Self::Object, E>;
}

/// Predict with model
///
/// This trait assumes the `PredictInplace` implementation and provides additional input/output
/// combinations.
///
/// # Provided implementation
///
/// * `&Records` -> `Targets`
/// * `DatasetBase<Records, _>` -> `DatasetBase<Records, Targets>`
pub trait Predict<R, T> {
    fn predict(&self, x: R) -> T;
}

/// Predict with model into a mutable reference of targets.
pub trait PredictInplace<R, T> {
    /// Predict something in place
    fn predict_inplace<'a>(&'a self, x: &'a R, y: &mut T);

    /// Create targets that `predict_inplace` works with.
    fn default_target(&self, x: &R) -> T;
}

impl<'a, R, T, O> Predict<&'a R, T> for O
where
    O: PredictInplace<R, T>,
{
    fn predict(&self, records: &'a R) -> T {
        let mut targets = self.default_target(records);
        self.predict_inplace(records, &mut targets);
        targets
    }
}

impl<R, T, S, O> Predict<DatasetBase<R, T>, DatasetBase<R, S>> for O
where
    R: Records,
    O: PredictInplace<R, S>,
{
    fn predict(&self, ds: DatasetBase<R, T>) -> DatasetBase<R, S> {
        let mut targets = self.default_target(&ds.records);
        self.predict_inplace(&ds.records, &mut targets);
        ds.with_targets(targets)
    }
}
