//! Gradient boosted regression trees
//!
//! Residual boosting with shrinkage and optional row subsampling, on shallow
//! decision trees. Seeded with Xoshiro256++ for reproducible subsamples.

use crate::error::{AutomlError, Result};
use crate::models::decision_tree::DecisionTreeRegressor;
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

/// Gradient boosting regressor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostingRegressor {
    trees: Vec<DecisionTreeRegressor>,
    initial_prediction: f64,
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub subsample: f64,
    pub seed: u64,
    n_features: usize,
}

impl GradientBoostingRegressor {
    pub fn new(n_estimators: usize, learning_rate: f64, seed: u64) -> Self {
        Self {
            trees: Vec::new(),
            initial_prediction: 0.0,
            n_estimators,
            learning_rate,
            max_depth: 3,
            subsample: 1.0,
            seed,
            n_features: 0,
        }
    }

    pub fn with_subsample(mut self, subsample: f64) -> Self {
        self.subsample = subsample;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n = x.nrows();
        if n != y.len() {
            return Err(AutomlError::ShapeError {
                expected: format!("{} labels", n),
                actual: format!("{} labels", y.len()),
            });
        }
        if self.n_estimators == 0 {
            return Err(AutomlError::TrainingError(
                "gradient boosting needs at least one round".into(),
            ));
        }
        if self.learning_rate <= 0.0 || !self.learning_rate.is_finite() {
            return Err(AutomlError::TrainingError(format!(
                "learning rate must be positive and finite, got {}",
                self.learning_rate
            )));
        }
        if !(0.0..=1.0).contains(&self.subsample) || self.subsample == 0.0 {
            return Err(AutomlError::TrainingError(format!(
                "subsample must be in (0, 1], got {}",
                self.subsample
            )));
        }

        self.n_features = x.ncols();
        self.initial_prediction = y.iter().sum::<f64>() / n as f64;
        self.trees = Vec::with_capacity(self.n_estimators);

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.seed);
        let mut predictions = Array1::from_elem(n, self.initial_prediction);
        let sample_size = ((n as f64 * self.subsample).round() as usize).clamp(1, n);

        for _ in 0..self.n_estimators {
            let residuals: Array1<f64> = y
                .iter()
                .zip(predictions.iter())
                .map(|(yi, pi)| yi - pi)
                .collect();

            let mut tree = DecisionTreeRegressor::new().with_max_depth(self.max_depth);
            if sample_size < n {
                let mut indices: Vec<usize> = (0..n).collect();
                indices.shuffle(&mut rng);
                indices.truncate(sample_size);
                let x_sub = x.select(Axis(0), &indices);
                let r_sub: Array1<f64> = indices.iter().map(|&i| residuals[i]).collect();
                tree.fit(&x_sub, &r_sub)?;
            } else {
                tree.fit(x, &residuals)?;
            }

            let update = tree.predict(x)?;
            predictions = predictions + update * self.learning_rate;
            self.trees.push(tree);
        }

        Ok(())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(AutomlError::ModelNotFitted);
        }
        let mut predictions = Array1::from_elem(x.nrows(), self.initial_prediction);
        for tree in &self.trees {
            predictions = predictions + tree.predict(x)? * self.learning_rate;
        }
        Ok(predictions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_data() -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_fn((20, 1), |(i, _)| i as f64);
        let y = Array1::from_shape_fn(20, |i| 2.0 * i as f64 + 1.0);
        (x, y)
    }

    #[test]
    fn test_boosting_reduces_error() {
        let (x, y) = ramp_data();
        let mean = y.iter().sum::<f64>() / y.len() as f64;
        let baseline: f64 = y.iter().map(|v| (v - mean).powi(2)).sum();

        let mut model = GradientBoostingRegressor::new(50, 0.1, 42);
        model.fit(&x, &y).unwrap();
        let pred = model.predict(&x).unwrap();
        let sse: f64 = y
            .iter()
            .zip(pred.iter())
            .map(|(t, p)| (t - p).powi(2))
            .sum();
        assert!(sse < baseline * 0.1, "sse {} vs baseline {}", sse, baseline);
    }

    #[test]
    fn test_subsampled_fit_is_reproducible() {
        let (x, y) = ramp_data();
        let mut a = GradientBoostingRegressor::new(20, 0.1, 3).with_subsample(0.7);
        let mut b = GradientBoostingRegressor::new(20, 0.1, 3).with_subsample(0.7);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(a.predict(&x).unwrap(), b.predict(&x).unwrap());
    }

    #[test]
    fn test_invalid_learning_rate() {
        let (x, y) = ramp_data();
        let mut model = GradientBoostingRegressor::new(10, 0.0, 42);
        assert!(matches!(
            model.fit(&x, &y),
            Err(AutomlError::TrainingError(_))
        ));
    }
}
