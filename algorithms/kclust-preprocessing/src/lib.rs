//! # Preprocessing
//! ## The Big Picture
//!
//! `kclust-preprocessing` prepares a table for k-means. Euclidean distances are dominated by the
//! features with the widest spread, so features measured in different units are usually brought
//! to a common scale before clustering.
//!
//! ## Current state
//! `kclust-preprocessing` provides a [standard scaler](standard_scaling::StandardScaler), which
//! centres every feature on its mean and divides it by its standard deviation.

pub mod error;
pub mod standard_scaling;

pub use error::PreprocessingError;
pub use standard_scaling::{FittedStandardScaler, StandardScaler};
