use super::{Dataset, DatasetBase, DatasetView, Float, Records};
use crate::error::{Error, Result};
use ndarray::{Array1, Array2, ArrayBase, Data, Ix2};

/// Implementation without constraints on records and targets
///
/// This implementation block provides a method for the creation of datasets
/// from records and targets, as well as methods to access or swap them.
impl<R: Records, T> DatasetBase<R, T> {
    /// Create a new dataset from records and targets
    ///
    /// # Example
    ///
    /// ```ignore
    /// let dataset = Dataset::new(records, ());
    /// ```
    pub fn new(records: R, targets: T) -> DatasetBase<R, T> {
        DatasetBase {
            records,
            targets,
            observation_names: Vec::new(),
            feature_names: Vec::new(),
        }
    }

    /// Returns reference to records
    pub fn records(&self) -> &R {
        &self.records
    }

    /// Returns reference to targets
    pub fn targets(&self) -> &T {
        &self.targets
    }

    /// Updates the records of a dataset
    ///
    /// This function overwrites the records in a dataset. The number of observations is assumed
    /// unchanged, so names are kept.
    pub fn with_records<U: Records>(self, records: U) -> DatasetBase<U, T> {
        DatasetBase {
            records,
            targets: self.targets,
            observation_names: self.observation_names,
            feature_names: self.feature_names,
        }
    }

    /// Updates the targets field, keeping records and names
    pub fn with_targets<S>(self, targets: S) -> DatasetBase<R, S> {
        DatasetBase {
            records: self.records,
            targets,
            observation_names: self.observation_names,
            feature_names: self.feature_names,
        }
    }

    /// Updates the feature names
    pub fn with_feature_names<I: Into<String>>(mut self, names: Vec<I>) -> DatasetBase<R, T> {
        self.feature_names = names.into_iter().map(Into::into).collect();

        self
    }

    /// Updates the observation names
    pub fn with_observation_names<I: Into<String>>(mut self, names: Vec<I>) -> DatasetBase<R, T> {
        self.observation_names = names.into_iter().map(Into::into).collect();

        self
    }

    /// Updates the observation names, failing if there is not exactly one per record
    pub fn try_with_observation_names<I: Into<String>>(
        self,
        names: Vec<I>,
    ) -> Result<DatasetBase<R, T>> {
        if names.len() != self.records.nsamples() {
            return Err(Error::Parameters(format!(
                "expected {} observation names, got {}",
                self.records.nsamples(),
                names.len()
            )));
        }

        Ok(self.with_observation_names(names))
    }

    /// Returns feature names
    ///
    /// A feature name gives a human-readable string describing the purpose of a single feature.
    /// If no names were set, `feature-<index>` is returned for every column.
    pub fn feature_names(&self) -> Vec<String> {
        if !self.feature_names.is_empty() {
            self.feature_names.clone()
        } else {
            (0..self.records.nfeatures())
                .map(|idx| format!("feature-{}", idx))
                .collect()
        }
    }

    /// Returns observation names
    ///
    /// If no names were set, the row index is used.
    pub fn observation_names(&self) -> Vec<String> {
        if !self.observation_names.is_empty() {
            self.observation_names.clone()
        } else {
            (0..self.records.nsamples())
                .map(|idx| idx.to_string())
                .collect()
        }
    }
}

impl<F: Float, S: Data<Elem = F>, T: Clone> DatasetBase<ArrayBase<S, Ix2>, T> {
    /// Creates a view of the records, cloning targets and names
    pub fn view(&self) -> DatasetView<'_, F, T> {
        DatasetBase {
            records: self.records.view(),
            targets: self.targets.clone(),
            observation_names: self.observation_names.clone(),
            feature_names: self.feature_names.clone(),
        }
    }
}

impl<F: Float> Dataset<F> {
    /// Create a new dataset from records, rejecting NaN and infinite values
    pub fn try_new(records: Array2<F>) -> Result<Dataset<F>> {
        if records.iter().any(|x| !x.is_finite()) {
            return Err(Error::NonFinite);
        }

        Ok(DatasetBase::new(records, ()))
    }
}

impl<F: Float> From<Array2<F>> for Dataset<F> {
    fn from(records: Array2<F>) -> Self {
        DatasetBase::new(records, ())
    }
}

impl<F: Float> From<(Array2<F>, Array1<usize>)> for Dataset<F, Array1<usize>> {
    fn from(rec_tar: (Array2<F>, Array1<usize>)) -> Self {
        DatasetBase::new(rec_tar.0, rec_tar.1)
    }
}
