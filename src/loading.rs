//! CSV loading for the training entry point
//!
//! The engine itself consumes pre-built matrices; this module is the thin
//! bridge used by the binary to turn an already-transformed numeric CSV
//! into a [`Dataset`]. All columns must be castable to f64.

use crate::data::Dataset;
use crate::error::{AutomlError, Result};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// Load a numeric CSV into a dataset, using `target` as the label column.
pub fn load_csv_dataset(path: &Path, target: &str) -> Result<Dataset> {
    let df = read_csv(path)?;

    let feature_cols: Vec<String> = df
        .get_column_names()
        .into_iter()
        .filter(|name| name.as_str() != target)
        .map(|s| s.to_string())
        .collect();
    if feature_cols.len() == df.width() {
        return Err(AutomlError::DataError(format!(
            "target column '{}' not found in {}",
            target,
            path.display()
        )));
    }

    let labels = column_to_f64(&df, target)?;
    let features = columns_to_matrix(&df, &feature_cols)?;
    Dataset::new(features, Array1::from_vec(labels))
}

fn read_csv(path: &Path) -> Result<DataFrame> {
    let file = File::open(path).map_err(|e| {
        AutomlError::DataError(format!("cannot open {}: {}", path.display(), e))
    })?;

    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(100))
        .into_reader_with_file_handle(file)
        .finish()
        .map_err(|e| AutomlError::DataError(e.to_string()))
}

fn column_to_f64(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let column = df
        .column(name)
        .map_err(|_| AutomlError::DataError(format!("column '{}' not found", name)))?;
    let casted = column
        .cast(&DataType::Float64)
        .map_err(|e| AutomlError::DataError(e.to_string()))?;
    let values = casted
        .as_materialized_series()
        .f64()
        .map_err(|e| AutomlError::DataError(e.to_string()))?
        .into_iter()
        .map(|v| {
            v.ok_or_else(|| {
                AutomlError::DataError(format!("column '{}' contains missing values", name))
            })
        })
        .collect::<Result<Vec<f64>>>()?;
    Ok(values)
}

fn columns_to_matrix(df: &DataFrame, names: &[String]) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let columns: Vec<Vec<f64>> = names
        .iter()
        .map(|name| column_to_f64(df, name))
        .collect::<Result<Vec<_>>>()?;
    Ok(Array2::from_shape_fn((n_rows, names.len()), |(r, c)| {
        columns[c][r]
    }))
}
