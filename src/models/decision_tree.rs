//! Regression decision tree
//!
//! Greedy splitting with prefix-sum scans per feature, under a configurable
//! impurity criterion. Also serves as the base learner for the forest and
//! boosting families.

use crate::error::{AutomlError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Impurity criterion for split evaluation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Criterion {
    /// Sum-of-squared-error reduction
    #[default]
    SquaredError,
    /// Friedman's improvement score (weighted mean separation)
    FriedmanMse,
    /// Absolute deviation from the side medians
    AbsoluteError,
    /// Half Poisson deviance; requires non-negative labels
    Poisson,
}

impl Criterion {
    /// Parse a criterion from its catalog name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "squared_error" => Some(Self::SquaredError),
            "friedman_mse" => Some(Self::FriedmanMse),
            "absolute_error" => Some(Self::AbsoluteError),
            "poisson" => Some(Self::Poisson),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// Decision tree regressor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTreeRegressor {
    root: Option<Node>,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub criterion: Criterion,
    n_features: usize,
}

impl Default for DecisionTreeRegressor {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionTreeRegressor {
    pub fn new() -> Self {
        Self {
            root: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            criterion: Criterion::SquaredError,
            n_features: 0,
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples;
        self
    }

    pub fn with_criterion(mut self, criterion: Criterion) -> Self {
        self.criterion = criterion;
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
        if n == 0 {
            return Err(AutomlError::TrainingError(
                "cannot fit a tree on zero samples".into(),
            ));
        }
        if self.criterion == Criterion::Poisson {
            if y.iter().any(|&v| v < 0.0) {
                return Err(AutomlError::TrainingError(
                    "poisson criterion requires non-negative labels".into(),
                ));
            }
            if y.iter().sum::<f64>() <= 0.0 {
                return Err(AutomlError::TrainingError(
                    "poisson criterion requires a positive label sum".into(),
                ));
            }
        }
        self.n_features = x.ncols();
        let indices: Vec<usize> = (0..n).collect();
        self.root = Some(self.build(x, y, &indices, 0));
        Ok(())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let root = self.root.as_ref().ok_or(AutomlError::ModelNotFitted)?;
        if x.ncols() != self.n_features {
            return Err(AutomlError::ShapeError {
                expected: format!("{} features", self.n_features),
                actual: format!("{} features", x.ncols()),
            });
        }
        let preds = (0..x.nrows())
            .map(|row| {
                let mut node = root;
                loop {
                    match node {
                        Node::Leaf { value } => return *value,
                        Node::Split {
                            feature,
                            threshold,
                            left,
                            right,
                        } => {
                            node = if x[[row, *feature]] <= *threshold {
                                left
                            } else {
                                right
                            };
                        }
                    }
                }
            })
            .collect();
        Ok(preds)
    }

    fn build(&self, x: &Array2<f64>, y: &Array1<f64>, indices: &[usize], depth: usize) -> Node {
        let n = indices.len();

        let depth_reached = self.max_depth.is_some_and(|d| depth >= d);
        if depth_reached || n < self.min_samples_split {
            return Node::Leaf {
                value: self.leaf_value(y, indices),
            };
        }

        match self.best_split(x, y, indices) {
            Some((feature, threshold)) => {
                let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
                    .iter()
                    .copied()
                    .partition(|&i| x[[i, feature]] <= threshold);
                if left_idx.is_empty() || right_idx.is_empty() {
                    return Node::Leaf {
                        value: self.leaf_value(y, indices),
                    };
                }
                Node::Split {
                    feature,
                    threshold,
                    left: Box::new(self.build(x, y, &left_idx, depth + 1)),
                    right: Box::new(self.build(x, y, &right_idx, depth + 1)),
                }
            }
            None => Node::Leaf {
                value: self.leaf_value(y, indices),
            },
        }
    }

    /// Leaf prediction: the median under absolute error, the mean otherwise.
    fn leaf_value(&self, y: &Array1<f64>, indices: &[usize]) -> f64 {
        match self.criterion {
            Criterion::AbsoluteError => {
                let mut labels: Vec<f64> = indices.iter().map(|&i| y[i]).collect();
                labels.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
                labels[labels.len() / 2]
            }
            _ => indices.iter().map(|&i| y[i]).sum::<f64>() / indices.len() as f64,
        }
    }

    /// Best (feature, threshold) under the configured criterion, or `None`
    /// when no split satisfies the leaf-size constraint.
    fn best_split(&self, x: &Array2<f64>, y: &Array1<f64>, indices: &[usize]) -> Option<(usize, f64)> {
        let n = indices.len();
        let total_sum: f64 = indices.iter().map(|&i| y[i]).sum();
        let total_sq: f64 = indices.iter().map(|&i| y[i] * y[i]).sum();
        let parent_sse = total_sq - total_sum * total_sum / n as f64;
        if parent_sse <= 1e-12 {
            return None; // already pure, no criterion can improve
        }

        match self.criterion {
            Criterion::AbsoluteError => self.best_split_absolute(x, y, indices),
            _ => self.best_split_moments(x, y, indices, total_sum, total_sq),
        }
    }

    /// Prefix-sum scan for the criteria expressible through side sums:
    /// squared error, Friedman's improvement score, and Poisson deviance.
    fn best_split_moments(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        total_sum: f64,
        total_sq: f64,
    ) -> Option<(usize, f64)> {
        let n = indices.len();
        let mut best: Option<(usize, f64, f64)> = None;

        for feature in 0..x.ncols() {
            let sorted = sort_by_feature(x, indices, feature);

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;
            for (pos, &i) in sorted.iter().enumerate().take(n - 1) {
                left_sum += y[i];
                left_sq += y[i] * y[i];

                let left_n = (pos + 1) as f64;
                let right_n = (n - pos - 1) as f64;
                if (pos + 1) < self.min_samples_leaf || (n - pos - 1) < self.min_samples_leaf {
                    continue;
                }
                let here = x[[i, feature]];
                let next = x[[sorted[pos + 1], feature]];
                if next <= here {
                    continue; // no threshold separates equal values
                }

                let right_sum = total_sum - left_sum;
                let right_sq = total_sq - left_sq;
                let cost = match self.criterion {
                    Criterion::SquaredError => {
                        (left_sq - left_sum * left_sum / left_n)
                            + (right_sq - right_sum * right_sum / right_n)
                    }
                    Criterion::FriedmanMse => {
                        let diff = left_sum / left_n - right_sum / right_n;
                        -(left_n * right_n / n as f64) * diff * diff
                    }
                    Criterion::Poisson => {
                        // Deviance up to a split-independent constant:
                        // -sum(y) * ln(mean) per side, both means positive
                        if left_sum <= 0.0 || right_sum <= 0.0 {
                            continue;
                        }
                        -(left_sum * (left_sum / left_n).ln()
                            + right_sum * (right_sum / right_n).ln())
                    }
                    Criterion::AbsoluteError => unreachable!("handled by best_split_absolute"),
                };

                if best.as_ref().is_none_or(|&(_, _, b)| cost < b) {
                    best = Some((feature, (here + next) / 2.0, cost));
                }
            }
        }

        best.map(|(feature, threshold, _)| (feature, threshold))
    }

    /// Median-deviation scan: per feature, cumulative absolute-deviation
    /// costs for every prefix and suffix, then the usual candidate walk.
    fn best_split_absolute(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
    ) -> Option<(usize, f64)> {
        let n = indices.len();
        let mut best: Option<(usize, f64, f64)> = None;

        for feature in 0..x.ncols() {
            let sorted = sort_by_feature(x, indices, feature);
            let left_costs = abs_deviation_costs(sorted.iter().map(|&i| y[i]));
            let right_costs = abs_deviation_costs(sorted.iter().rev().map(|&i| y[i]));

            for (pos, &i) in sorted.iter().enumerate().take(n - 1) {
                if (pos + 1) < self.min_samples_leaf || (n - pos - 1) < self.min_samples_leaf {
                    continue;
                }
                let here = x[[i, feature]];
                let next = x[[sorted[pos + 1], feature]];
                if next <= here {
                    continue;
                }

                // right_costs[k] covers the last k+1 rows; the right side
                // after pos holds n-1-pos rows
                let cost = left_costs[pos] + right_costs[n - pos - 2];
                if best.as_ref().is_none_or(|&(_, _, b)| cost < b) {
                    best = Some((feature, (here + next) / 2.0, cost));
                }
            }
        }

        best.map(|(feature, threshold, _)| (feature, threshold))
    }
}

fn sort_by_feature(x: &Array2<f64>, indices: &[usize], feature: usize) -> Vec<usize> {
    let mut sorted = indices.to_vec();
    sorted.sort_by(|&a, &b| {
        x[[a, feature]]
            .partial_cmp(&x[[b, feature]])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    sorted
}

/// For each prefix of the label sequence, the sum of absolute deviations
/// from that prefix's median.
fn abs_deviation_costs(labels: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut sorted: Vec<f64> = Vec::new();
    let mut costs = Vec::new();
    for value in labels {
        let at = sorted.partition_point(|&s| s < value);
        sorted.insert(at, value);
        let median = sorted[sorted.len() / 2];
        costs.push(sorted.iter().map(|s| (s - median).abs()).sum());
    }
    costs
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_step_function() {
        let x = array![[1.0], [2.0], [3.0], [10.0], [11.0], [12.0]];
        let y = array![0.0, 0.0, 0.0, 5.0, 5.0, 5.0];
        let mut tree = DecisionTreeRegressor::new();
        tree.fit(&x, &y).unwrap();
        let pred = tree.predict(&array![[2.5], [11.5]]).unwrap();
        assert_eq!(pred[0], 0.0);
        assert_eq!(pred[1], 5.0);
    }

    #[test]
    fn test_max_depth_limits_tree() {
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0], [6.0], [7.0], [8.0]];
        let y = array![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let mut stump = DecisionTreeRegressor::new().with_max_depth(1);
        stump.fit(&x, &y).unwrap();
        // Depth-1 tree can output at most two distinct values
        let pred = stump.predict(&x).unwrap();
        let mut values: Vec<f64> = pred.to_vec();
        values.sort_by(|a, b| a.partial_cmp(b).unwrap());
        values.dedup();
        assert!(values.len() <= 2);
    }

    #[test]
    fn test_constant_labels_yield_leaf() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![7.0, 7.0, 7.0];
        let mut tree = DecisionTreeRegressor::new();
        tree.fit(&x, &y).unwrap();
        let pred = tree.predict(&array![[99.0]]).unwrap();
        assert_eq!(pred[0], 7.0);
    }

    #[test]
    fn test_predict_wrong_width() {
        let mut tree = DecisionTreeRegressor::new();
        tree.fit(&array![[1.0], [2.0]], &array![1.0, 2.0]).unwrap();
        assert!(tree.predict(&array![[1.0, 2.0]]).is_err());
    }

    #[test]
    fn test_criterion_names() {
        assert_eq!(
            Criterion::from_name("squared_error"),
            Some(Criterion::SquaredError)
        );
        assert_eq!(
            Criterion::from_name("friedman_mse"),
            Some(Criterion::FriedmanMse)
        );
        assert_eq!(
            Criterion::from_name("absolute_error"),
            Some(Criterion::AbsoluteError)
        );
        assert_eq!(Criterion::from_name("poisson"), Some(Criterion::Poisson));
        assert_eq!(Criterion::from_name("gini"), None);
    }

    #[test]
    fn test_every_criterion_splits_step_function() {
        let x = array![[1.0], [2.0], [3.0], [10.0], [11.0], [12.0]];
        let y = array![1.0, 1.0, 1.0, 5.0, 5.0, 5.0];
        for criterion in [
            Criterion::SquaredError,
            Criterion::FriedmanMse,
            Criterion::AbsoluteError,
            Criterion::Poisson,
        ] {
            let mut tree = DecisionTreeRegressor::new().with_criterion(criterion);
            tree.fit(&x, &y).unwrap();
            let pred = tree.predict(&array![[2.5], [11.5]]).unwrap();
            assert_eq!(pred[0], 1.0, "{criterion:?}");
            assert_eq!(pred[1], 5.0, "{criterion:?}");
        }
    }

    #[test]
    fn test_absolute_error_tracks_median() {
        // One wild outlier: the median-based split keeps the clean side's
        // leaf at the majority value
        let x = array![[1.0], [2.0], [3.0], [4.0], [10.0], [11.0]];
        let y = array![2.0, 2.0, 2.0, 1000.0, 8.0, 8.0];
        let mut tree = DecisionTreeRegressor::new()
            .with_criterion(Criterion::AbsoluteError)
            .with_max_depth(1);
        tree.fit(&x, &y).unwrap();
        assert!(tree.predict(&array![[11.5]]).unwrap()[0] < 100.0);
    }

    #[test]
    fn test_poisson_rejects_negative_labels() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![1.0, -2.0, 3.0];
        let mut tree = DecisionTreeRegressor::new().with_criterion(Criterion::Poisson);
        assert!(matches!(
            tree.fit(&x, &y),
            Err(AutomlError::TrainingError(_))
        ));
    }
}
