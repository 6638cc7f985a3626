//! K-nearest-neighbors regressor
//!
//! Euclidean distance scan over the retained training set, uniform average
//! of the k nearest labels.

use crate::error::{AutomlError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// KNN regressor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnnRegressor {
    pub n_neighbors: usize,
    x_train: Option<Array2<f64>>,
    y_train: Option<Array1<f64>>,
}

impl KnnRegressor {
    pub fn new(n_neighbors: usize) -> Self {
        Self {
            n_neighbors,
            x_train: None,
            y_train: None,
        }
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n = x.nrows();
        if n != y.len() {
            return Err(AutomlError::ShapeError {
                expected: format!("{} labels", n),
                actual: format!("{} labels", y.len()),
            });
        }
        if self.n_neighbors == 0 {
            return Err(AutomlError::TrainingError(
                "n_neighbors must be at least 1".into(),
            ));
        }
        if self.n_neighbors > n {
            return Err(AutomlError::TrainingError(format!(
                "n_neighbors = {} exceeds the {} training samples",
                self.n_neighbors, n
            )));
        }
        self.x_train = Some(x.clone());
        self.y_train = Some(y.clone());
        Ok(())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let x_train = self.x_train.as_ref().ok_or(AutomlError::ModelNotFitted)?;
        let y_train = self.y_train.as_ref().ok_or(AutomlError::ModelNotFitted)?;
        if x.ncols() != x_train.ncols() {
            return Err(AutomlError::ShapeError {
                expected: format!("{} features", x_train.ncols()),
                actual: format!("{} features", x.ncols()),
            });
        }

        let preds = (0..x.nrows())
            .map(|row| {
                let mut dists: Vec<(f64, f64)> = (0..x_train.nrows())
                    .map(|t| {
                        let d = (0..x.ncols())
                            .map(|c| {
                                let diff = x[[row, c]] - x_train[[t, c]];
                                diff * diff
                            })
                            .sum::<f64>();
                        (d, y_train[t])
                    })
                    .collect();
                dists.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
                dists
                    .iter()
                    .take(self.n_neighbors)
                    .map(|(_, label)| label)
                    .sum::<f64>()
                    / self.n_neighbors as f64
            })
            .collect();
        Ok(preds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_single_neighbor_recalls_training_label() {
        let x = array![[0.0], [10.0], [20.0]];
        let y = array![1.0, 2.0, 3.0];
        let mut model = KnnRegressor::new(1);
        model.fit(&x, &y).unwrap();
        let pred = model.predict(&array![[9.0]]).unwrap();
        assert_eq!(pred[0], 2.0);
    }

    #[test]
    fn test_k_averages_neighbors() {
        let x = array![[0.0], [1.0], [100.0]];
        let y = array![2.0, 4.0, 100.0];
        let mut model = KnnRegressor::new(2);
        model.fit(&x, &y).unwrap();
        let pred = model.predict(&array![[0.5]]).unwrap();
        assert_eq!(pred[0], 3.0);
    }

    #[test]
    fn test_k_larger_than_samples_fails() {
        let x = array![[0.0], [1.0]];
        let y = array![1.0, 2.0];
        let mut model = KnnRegressor::new(50);
        assert!(matches!(
            model.fit(&x, &y),
            Err(AutomlError::TrainingError(_))
        ));
    }
}
