//! AdaBoost regressor
//!
//! AdaBoost.R2 with linear loss on shallow decision trees: rounds resample
//! the training set by weight, fit a tree, and reweight by each row's
//! relative error. Prediction is the weighted median of the rounds.

use crate::error::{AutomlError, Result};
use crate::models::decision_tree::DecisionTreeRegressor;
use ndarray::{Array1, Array2, Axis};
use rand::distributions::{Distribution, WeightedIndex};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

/// AdaBoost.R2 regressor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaBoostRegressor {
    trees: Vec<DecisionTreeRegressor>,
    tree_weights: Vec<f64>,
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub seed: u64,
    n_features: usize,
}

impl AdaBoostRegressor {
    pub fn new(n_estimators: usize, learning_rate: f64, seed: u64) -> Self {
        Self {
            trees: Vec::new(),
            tree_weights: Vec::new(),
            n_estimators,
            learning_rate,
            max_depth: 3,
            seed,
            n_features: 0,
        }
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
                "adaboost needs at least one round".into(),
            ));
        }
        if self.learning_rate <= 0.0 || !self.learning_rate.is_finite() {
            return Err(AutomlError::TrainingError(format!(
                "learning rate must be positive and finite, got {}",
                self.learning_rate
            )));
        }

        self.n_features = x.ncols();
        self.trees = Vec::new();
        self.tree_weights = Vec::new();

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.seed);
        let mut weights = vec![1.0 / n as f64; n];

        for _ in 0..self.n_estimators {
            let dist = WeightedIndex::new(&weights)
                .map_err(|e| AutomlError::TrainingError(format!("degenerate row weights: {e}")))?;
            let sample: Vec<usize> = (0..n).map(|_| dist.sample(&mut rng)).collect();
            let x_boot = x.select(Axis(0), &sample);
            let y_boot: Array1<f64> = sample.iter().map(|&i| y[i]).collect();

            let mut tree = DecisionTreeRegressor::new().with_max_depth(self.max_depth);
            tree.fit(&x_boot, &y_boot)?;

            let pred = tree.predict(x)?;
            let errors: Vec<f64> = y
                .iter()
                .zip(pred.iter())
                .map(|(yi, pi)| (yi - pi).abs())
                .collect();
            let max_error = errors.iter().cloned().fold(0.0_f64, f64::max);
            if max_error <= 0.0 {
                // Perfect round; keep it and stop
                self.trees.push(tree);
                self.tree_weights.push(1.0);
                break;
            }

            let avg_loss: f64 = weights
                .iter()
                .zip(errors.iter())
                .map(|(w, e)| w * e / max_error)
                .sum();
            if avg_loss >= 0.5 {
                // Worse than random reweighting; stop, keeping at least one round
                if self.trees.is_empty() {
                    self.trees.push(tree);
                    self.tree_weights.push(1.0);
                }
                break;
            }

            let beta = avg_loss / (1.0 - avg_loss);
            self.trees.push(tree);
            self.tree_weights.push(self.learning_rate * (1.0 / beta).ln());

            for (w, e) in weights.iter_mut().zip(errors.iter()) {
                *w *= beta.powf(self.learning_rate * (1.0 - e / max_error));
            }
            let total: f64 = weights.iter().sum();
            if total <= 0.0 || !total.is_finite() {
                break;
            }
            for w in weights.iter_mut() {
                *w /= total;
            }
        }

        Ok(())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(AutomlError::ModelNotFitted);
        }
        let per_tree: Vec<Array1<f64>> = self
            .trees
            .iter()
            .map(|tree| tree.predict(x))
            .collect::<Result<Vec<_>>>()?;

        let half_weight: f64 = self.tree_weights.iter().sum::<f64>() / 2.0;
        let preds = (0..x.nrows())
            .map(|row| {
                let mut ranked: Vec<(f64, f64)> = per_tree
                    .iter()
                    .zip(self.tree_weights.iter())
                    .map(|(pred, &w)| (pred[row], w))
                    .collect();
                ranked.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

                // Weighted median across rounds
                let mut acc = 0.0;
                for &(value, weight) in &ranked {
                    acc += weight;
                    if acc >= half_weight {
                        return value;
                    }
                }
                ranked[ranked.len() - 1].0
            })
            .collect();
        Ok(preds)
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
    fn test_boosting_beats_mean_baseline() {
        let (x, y) = ramp_data();
        let mean = y.iter().sum::<f64>() / y.len() as f64;
        let baseline: f64 = y.iter().map(|v| (v - mean).powi(2)).sum();

        let mut model = AdaBoostRegressor::new(30, 0.5, 42);
        model.fit(&x, &y).unwrap();
        let pred = model.predict(&x).unwrap();
        let sse: f64 = y
            .iter()
            .zip(pred.iter())
            .map(|(t, p)| (t - p).powi(2))
            .sum();
        assert!(sse < baseline * 0.2, "sse {} vs baseline {}", sse, baseline);
    }

    #[test]
    fn test_seeded_fit_is_reproducible() {
        let (x, y) = ramp_data();
        let mut a = AdaBoostRegressor::new(15, 0.1, 3);
        let mut b = AdaBoostRegressor::new(15, 0.1, 3);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(a.predict(&x).unwrap(), b.predict(&x).unwrap());
    }

    #[test]
    fn test_invalid_learning_rate() {
        let (x, y) = ramp_data();
        let mut model = AdaBoostRegressor::new(10, -1.0, 42);
        assert!(matches!(
            model.fit(&x, &y),
            Err(AutomlError::TrainingError(_))
        ));
    }

    #[test]
    fn test_zero_rounds_rejected() {
        let (x, y) = ramp_data();
        let mut model = AdaBoostRegressor::new(0, 0.1, 42);
        assert!(matches!(
            model.fit(&x, &y),
            Err(AutomlError::TrainingError(_))
        ));
    }
}
