//! `kclust-datasets` provides tables ready to be partitioned in tests, benchmarks and examples.
//!
//! ## Current State
//!
//! Currently the following are provided:
//!
//! * `["arrests"]` : arrests per 100,000 residents for assault, murder and rape in each of the
//!   50 US states in 1973, together with the percentage of the population living in urban areas
//! * `["generate"]` : synthetic gaussian blobs around given centres
//!
//! Loaded tables are returned as a [`kclust::Dataset`] with named features and named
//! observations.
//!
//! ## Using a dataset
//!
//! Add the crate to your Cargo.toml with the corresponding feature enabled:
//! ```ignore
//! kclust-datasets = { version = "0.1.0", features = ["arrests"] }
//! ```
//! and then use it in your example or tests as
//! ```ignore
//! let dataset = kclust_datasets::arrests();
//! ```

#[cfg(feature = "generate")]
pub mod generate;

#[cfg(feature = "arrests")]
use csv::ReaderBuilder;
#[cfg(feature = "arrests")]
use flate2::read::GzDecoder;
#[cfg(feature = "arrests")]
use kclust::Dataset;
#[cfg(feature = "arrests")]
use ndarray::Array2;

/// Split a labelled table into its label column and its numeric columns
#[cfg(feature = "arrests")]
fn labelled_array_from_buf(buf: &[u8]) -> (Vec<String>, Vec<String>, Array2<f64>) {
    // unzip file
    let file = GzDecoder::new(buf);
    // create a CSV reader with headers and `,` as delimiter
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(b',')
        .from_reader(file);

    let headers = reader.headers().unwrap().clone();
    let feature_names = headers.iter().skip(1).map(String::from).collect::<Vec<_>>();

    let mut labels = Vec::new();
    let mut values = Vec::new();
    for record in reader.records() {
        let record = record.unwrap();
        labels.push(record[0].to_string());
        values.extend(record.iter().skip(1).map(|x| x.parse::<f64>().unwrap()));
    }

    let array = Array2::from_shape_vec((labels.len(), feature_names.len()), values).unwrap();
    (labels, feature_names, array)
}

#[cfg(feature = "arrests")]
/// Read in the arrests table, one row per state.
///
/// Features are `Murder`, `Assault` (arrests per 100,000 residents), `UrbanPop` (percent urban
/// population) and `Rape` (arrests per 100,000 residents). Rows are named after the state.
pub fn arrests() -> Dataset<f64> {
    let data = include_bytes!("../data/arrests.csv.gz");
    let (regions, feature_names, array) = labelled_array_from_buf(&data[..]);

    Dataset::from(array)
        .with_feature_names(feature_names)
        .with_observation_names(regions)
}
