//! Input dataset wrapper
//!
//! The transformation stage (out of scope) produces numeric matrices; this
//! module pairs a feature matrix with its label vector and enforces the
//! shape invariants once, at construction, so the engine can assume them.

use crate::error::{AutomlError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// A feature matrix with its paired label vector.
///
/// Invariants (checked by [`Dataset::new`]): the label length equals the row
/// count and the matrix is non-empty in both dimensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    features: Array2<f64>,
    labels: Array1<f64>,
}

impl Dataset {
    /// Create a dataset, validating shapes.
    pub fn new(features: Array2<f64>, labels: Array1<f64>) -> Result<Self> {
        if features.nrows() == 0 || features.ncols() == 0 {
            return Err(AutomlError::ValidationError(format!(
                "feature matrix must be non-empty, got {}x{}",
                features.nrows(),
                features.ncols()
            )));
        }
        if labels.len() != features.nrows() {
            return Err(AutomlError::ShapeError {
                expected: format!("{} labels", features.nrows()),
                actual: format!("{} labels", labels.len()),
            });
        }
        Ok(Self { features, labels })
    }

    pub fn features(&self) -> &Array2<f64> {
        &self.features
    }

    pub fn labels(&self) -> &Array1<f64> {
        &self.labels
    }

    pub fn n_rows(&self) -> usize {
        self.features.nrows()
    }

    pub fn n_cols(&self) -> usize {
        self.features.ncols()
    }

    /// Check that a train/test pair share a column count.
    pub fn check_compatible(train: &Dataset, test: &Dataset) -> Result<()> {
        if train.n_cols() != test.n_cols() {
            return Err(AutomlError::ShapeError {
                expected: format!("{} feature columns", train.n_cols()),
                actual: format!("{} feature columns", test.n_cols()),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_valid_dataset() {
        let ds = Dataset::new(array![[1.0, 2.0], [3.0, 4.0]], array![1.0, 2.0]).unwrap();
        assert_eq!(ds.n_rows(), 2);
        assert_eq!(ds.n_cols(), 2);
    }

    #[test]
    fn test_label_length_mismatch() {
        let result = Dataset::new(array![[1.0, 2.0], [3.0, 4.0]], array![1.0]);
        assert!(matches!(result, Err(AutomlError::ShapeError { .. })));
    }

    #[test]
    fn test_empty_matrix_rejected() {
        let result = Dataset::new(Array2::zeros((0, 3)), Array1::zeros(0));
        assert!(matches!(result, Err(AutomlError::ValidationError(_))));
    }

    #[test]
    fn test_column_count_mismatch() {
        let train = Dataset::new(array![[1.0, 2.0], [3.0, 4.0]], array![1.0, 2.0]).unwrap();
        let test = Dataset::new(array![[1.0], [2.0]], array![1.0, 2.0]).unwrap();
        assert!(Dataset::check_compatible(&train, &test).is_err());
    }
}
