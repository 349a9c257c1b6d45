//! Standard scaling

use crate::error::{PreprocessingError, Result};
use approx::abs_diff_eq;
use kclust::dataset::DatasetBase;
use kclust::traits::{Fit, Transformer};
use kclust::Float;
use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Ix2, Zip};

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

/// Standard scaler: learns the mean and the standard deviation of every feature of a dataset,
/// producing a [fitted standard scaler](FittedStandardScaler) that can be used to scale different
/// datasets using the same parameters.
///
/// The standard deviation is computed with `ddof` delta degrees of freedom: `1` (the sample
/// standard deviation) by default, `0` (the population standard deviation) with
/// [`population`](StandardScaler::population).
///
/// ### Example
///
/// ```rust
/// use kclust::traits::{Fit, Transformer};
/// use kclust_preprocessing::StandardScaler;
///
/// // Load dataset
/// let dataset = kclust_datasets::arrests();
/// // Learn scaling parameters
/// let scaler = StandardScaler::standard().fit(&dataset).unwrap();
/// // scale dataset according to parameters
/// let dataset = scaler.transform(dataset);
/// ```
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq)]
pub struct StandardScaler<F: Float> {
    ddof: F,
}

impl<F: Float> Default for StandardScaler<F> {
    fn default() -> Self {
        Self::standard()
    }
}

impl<F: Float> StandardScaler<F> {
    /// Initializes a scaler dividing by the sample standard deviation
    pub fn standard() -> Self {
        Self { ddof: F::one() }
    }

    /// Initializes a scaler dividing by the population standard deviation
    pub fn population() -> Self {
        Self { ddof: F::zero() }
    }

    /// Setter for the delta degrees of freedom
    pub fn ddof(mut self, ddof: F) -> Self {
        self.ddof = ddof;
        self
    }
}

impl<F: Float, D: Data<Elem = F>, T> Fit<ArrayBase<D, Ix2>, T, PreprocessingError>
    for StandardScaler<F>
{
    type Object = FittedStandardScaler<F>;

    /// Fits the input dataset. Will return an error if the dataset does not contain any
    /// samples, if it contains non-finite values or if `ddof` leaves no degree of freedom.
    fn fit(&self, x: &DatasetBase<ArrayBase<D, Ix2>, T>) -> Result<Self::Object> {
        FittedStandardScaler::standard(x.records(), self.ddof)
    }
}

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq)]
/// The result of fitting a [standard scaler](StandardScaler).
/// Scales datasets with the parameters learned during fitting.
pub struct FittedStandardScaler<F: Float> {
    offsets: Array1<F>,
    scales: Array1<F>,
}

impl<F: Float> FittedStandardScaler<F> {
    pub(crate) fn standard<D: Data<Elem = F>>(records: &ArrayBase<D, Ix2>, ddof: F) -> Result<Self> {
        let n_samples = records.nrows();
        if n_samples == 0 {
            return Err(PreprocessingError::NotEnoughSamples);
        }
        if ddof < F::zero() || ddof >= F::cast(n_samples) {
            return Err(PreprocessingError::InvalidDdof(ddof.to_string()));
        }
        if records.iter().any(|x| !x.is_finite()) {
            return Err(kclust::error::Error::NonFinite.into());
        }

        let means = records
            .mean_axis(Axis(0))
            .ok_or(PreprocessingError::NotEnoughSamples)?;
        let scales = records.std_axis(Axis(0), ddof).mapv(|s| {
            if abs_diff_eq!(s, F::zero()) {
                // if feature is constant then don't scale
                F::one()
            } else {
                F::one() / s
            }
        });

        Ok(Self {
            offsets: means,
            scales,
        })
    }

    /// Array of size `n_features` that contains the mean subtracted to each feature
    pub fn offsets(&self) -> &Array1<F> {
        &self.offsets
    }

    /// Array of size `n_features` that contains the scale applied to each centred feature
    pub fn scales(&self) -> &Array1<F> {
        &self.scales
    }
}

impl<F: Float> Transformer<Array2<F>, Array2<F>> for FittedStandardScaler<F> {
    /// Scales an array of size (nsamples, nfeatures) according to the scaler's `offsets` and `scales`.
    /// Panics if the shape of the input array is not compatible with the shape of the dataset used for fitting.
    fn transform(&self, x: Array2<F>) -> Array2<F> {
        if x.is_empty() {
            return x;
        }
        let mut x = x;
        Zip::from(x.columns_mut())
            .and(self.offsets())
            .and(self.scales())
            .for_each(|mut col, &offset, &scale| {
                col.mapv_inplace(|el| (el - offset) * scale);
            });
        x
    }
}

impl<F: Float, D: Data<Elem = F>, T>
    Transformer<DatasetBase<ArrayBase<D, Ix2>, T>, DatasetBase<Array2<F>, T>>
    for FittedStandardScaler<F>
{
    /// Substitutes the records of the dataset with their scaled version.
    /// Panics if the shape of the records is not compatible with the shape of the dataset used for fitting.
    fn transform(&self, x: DatasetBase<ArrayBase<D, Ix2>, T>) -> DatasetBase<Array2<F>, T> {
        let transformed_records = self.transform(x.records.to_owned());
        x.with_records(transformed_records)
    }
}
