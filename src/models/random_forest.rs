//! Random forest regressor
//!
//! Bootstrap-aggregated decision trees. Per-tree seeds are drawn up front
//! from a ChaCha8 stream so fitting the trees in parallel stays reproducible.

use crate::error::{AutomlError, Result};
use crate::models::decision_tree::DecisionTreeRegressor;
use ndarray::{Array1, Array2, Axis};
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Random forest regressor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    trees: Vec<DecisionTreeRegressor>,
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_leaf: usize,
    pub seed: u64,
    n_features: usize,
}

impl RandomForestRegressor {
    pub fn new(n_estimators: usize, seed: u64) -> Self {
        Self {
            trees: Vec::new(),
            n_estimators,
            max_depth: None,
            min_samples_leaf: 1,
            seed,
            n_features: 0,
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
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
                "random forest needs at least one tree".into(),
            ));
        }
        self.n_features = x.ncols();

        // Draw per-tree seeds sequentially, then fit trees in parallel
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let tree_seeds: Vec<u64> = (0..self.n_estimators).map(|_| rng.next_u64()).collect();

        self.trees = tree_seeds
            .into_par_iter()
            .map(|tree_seed| {
                let mut tree_rng = ChaCha8Rng::seed_from_u64(tree_seed);
                let sample: Vec<usize> = (0..n).map(|_| tree_rng.gen_range(0..n)).collect();
                let x_boot = x.select(Axis(0), &sample);
                let y_boot: Array1<f64> = sample.iter().map(|&i| y[i]).collect();

                let mut tree = DecisionTreeRegressor::new()
                    .with_min_samples_leaf(self.min_samples_leaf);
                if let Some(depth) = self.max_depth {
                    tree = tree.with_max_depth(depth);
                }
                tree.fit(&x_boot, &y_boot)?;
                Ok(tree)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(AutomlError::ModelNotFitted);
        }
        let mut total = Array1::<f64>::zeros(x.nrows());
        for tree in &self.trees {
            total = total + tree.predict(x)?;
        }
        Ok(total / self.trees.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn toy_data() -> (Array2<f64>, Array1<f64>) {
        let x = array![
            [1.0],
            [2.0],
            [3.0],
            [4.0],
            [10.0],
            [11.0],
            [12.0],
            [13.0]
        ];
        let y = array![1.0, 1.0, 1.0, 1.0, 9.0, 9.0, 9.0, 9.0];
        (x, y)
    }

    #[test]
    fn test_forest_separates_clusters() {
        let (x, y) = toy_data();
        let mut forest = RandomForestRegressor::new(20, 42);
        forest.fit(&x, &y).unwrap();
        let pred = forest.predict(&array![[2.0], [11.0]]).unwrap();
        assert!(pred[0] < 5.0);
        assert!(pred[1] > 5.0);
    }

    #[test]
    fn test_seeded_fits_are_identical() {
        let (x, y) = toy_data();
        let mut a = RandomForestRegressor::new(10, 7);
        let mut b = RandomForestRegressor::new(10, 7);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        let pa = a.predict(&x).unwrap();
        let pb = b.predict(&x).unwrap();
        assert_eq!(pa, pb);
    }

    #[test]
    fn test_zero_trees_rejected() {
        let (x, y) = toy_data();
        let mut forest = RandomForestRegressor::new(0, 42);
        assert!(matches!(
            forest.fit(&x, &y),
            Err(AutomlError::TrainingError(_))
        ));
    }
}
