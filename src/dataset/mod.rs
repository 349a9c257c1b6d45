//! Datasets
//!
//! This module implements the dataset struct and various helper traits to extend its
//! functionality.
use ndarray::{ArrayBase, ArrayView, Ix2, OwnedRepr, ScalarOperand};

use num_traits::{AsPrimitive, FromPrimitive, NumAssignOps, NumCast, Signed};
use rand::distributions::uniform::SampleUniform;

use std::fmt;
use std::iter::Sum;
use std::ops::{AddAssign, DivAssign, MulAssign, SubAssign};

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

mod impl_dataset;
mod impl_records;

/// Floating point numbers
///
/// This trait bound multiplexes to the most common assumption of floating point number and
/// implement them for 32bit and 64bit floating points. They are used in the records of a dataset,
/// in centroids and in every score computed from them.
pub trait Float:
    FromPrimitive
    + num_traits::Float
    + PartialOrd
    + Sync
    + Send
    + Default
    + fmt::Display
    + fmt::Debug
    + Signed
    + Sum
    + NumAssignOps
    + AsPrimitive<usize>
    + for<'a> AddAssign<&'a Self>
    + for<'a> MulAssign<&'a Self>
    + for<'a> SubAssign<&'a Self>
    + for<'a> DivAssign<&'a Self>
    + SampleUniform
    + ScalarOperand
    + approx::AbsDiffEq
{
    fn cast<T: NumCast>(x: T) -> Self {
        NumCast::from(x).unwrap()
    }
}

impl Float for f32 {}

impl Float for f64 {}

/// DatasetBase
///
/// This is the fundamental structure of a dataset. It contains a number of records about the data
/// and may contain targets, observation names and feature names. In order to keep the type
/// complexity low the dataset base is only generic over the records and targets. Names are always
/// owned and copied when views are created.
///
/// # Fields
///
/// * `records`: a two-dimensional matrix with dimensionality (nsamples, nfeatures)
/// * `targets`: `()` for raw tables, or a one-dimensional array of cluster memberships once a
/// table has been partitioned
/// * `observation_names`: optional unique names of the rows (e.g. a region name)
/// * `feature_names`: optional descriptive feature names with dimensionality (nfeatures)
///
/// The core never mutates the records of a dataset. Standardization, if wanted, happens before
/// the dataset is handed to an algorithm.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetBase<R, T> {
    pub records: R,
    pub targets: T,

    observation_names: Vec<String>,
    feature_names: Vec<String>,
}

/// Dataset
///
/// The most commonly used type of dataset. Records are stored as an owned `Array2`, targets
/// default to `()`.
pub type Dataset<F, T = ()> = DatasetBase<ArrayBase<OwnedRepr<F>, Ix2>, T>;

/// DatasetView
///
/// A read only view of a Dataset
pub type DatasetView<'a, F, T = ()> = DatasetBase<ArrayView<'a, F, Ix2>, T>;

/// Record trait
pub trait Records: Sized {
    type Elem;

    fn nsamples(&self) -> usize;
    fn nfeatures(&self) -> usize;
}
