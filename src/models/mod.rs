//! Model families
//!
//! Each family is a tagged variant with a fixed capability set: `fit` takes
//! (features, labels, hyperparameters, seed) and produces a fitted state;
//! `predict` maps a fitted state and features to predictions. No open-ended
//! dynamic dispatch — the registry holds [`ModelFamily`] tags and the search
//! engine moves [`FittedModel`] values around.

pub mod ada_boost;
pub mod decision_tree;
pub mod gradient_boosting;
pub mod knn;
pub mod linear;
pub mod random_forest;

pub use ada_boost::AdaBoostRegressor;
pub use decision_tree::{Criterion, DecisionTreeRegressor};
pub use gradient_boosting::GradientBoostingRegressor;
pub use knn::KnnRegressor;
pub use linear::LinearRegression;
pub use random_forest::RandomForestRegressor;

use crate::error::{AutomlError, Result};
use crate::params::ParamMap;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// The model family catalog entries dispatch on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelFamily {
    Linear,
    DecisionTree,
    RandomForest,
    GradientBoosting,
    AdaBoost,
    KNearest,
}

impl ModelFamily {
    /// Fit this family on training data with one hyperparameter combination.
    ///
    /// `seed` drives stochastic families (forest, boosting); deterministic
    /// families ignore it. Unknown or ill-typed hyperparameters fail the fit.
    pub fn fit(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        params: &ParamMap,
        seed: u64,
    ) -> Result<FittedModel> {
        match self {
            Self::Linear => {
                reject_unknown(params, &[])?;
                let mut model = LinearRegression::new();
                model.fit(x, y)?;
                Ok(FittedModel::Linear(model))
            }
            Self::DecisionTree => {
                reject_unknown(params, &["criterion", "max_depth"])?;
                let mut model = DecisionTreeRegressor::new();
                if let Some(name) = str_param(params, "criterion")? {
                    let criterion = Criterion::from_name(name).ok_or_else(|| {
                        AutomlError::TrainingError(format!("unknown criterion '{}'", name))
                    })?;
                    model = model.with_criterion(criterion);
                }
                if let Some(depth) = usize_param(params, "max_depth")? {
                    model = model.with_max_depth(depth);
                }
                model.fit(x, y)?;
                Ok(FittedModel::DecisionTree(model))
            }
            Self::RandomForest => {
                reject_unknown(params, &["n_estimators", "max_depth"])?;
                let n_estimators = usize_param(params, "n_estimators")?.unwrap_or(100);
                let mut model = RandomForestRegressor::new(n_estimators, seed);
                if let Some(depth) = usize_param(params, "max_depth")? {
                    model = model.with_max_depth(depth);
                }
                model.fit(x, y)?;
                Ok(FittedModel::RandomForest(model))
            }
            Self::GradientBoosting => {
                reject_unknown(params, &["n_estimators", "learning_rate", "subsample", "max_depth"])?;
                let n_estimators = usize_param(params, "n_estimators")?.unwrap_or(100);
                let learning_rate = f64_param(params, "learning_rate")?.unwrap_or(0.1);
                let mut model = GradientBoostingRegressor::new(n_estimators, learning_rate, seed);
                if let Some(subsample) = f64_param(params, "subsample")? {
                    model = model.with_subsample(subsample);
                }
                if let Some(depth) = usize_param(params, "max_depth")? {
                    model = model.with_max_depth(depth);
                }
                model.fit(x, y)?;
                Ok(FittedModel::GradientBoosting(model))
            }
            Self::AdaBoost => {
                reject_unknown(params, &["n_estimators", "learning_rate", "max_depth"])?;
                let n_estimators = usize_param(params, "n_estimators")?.unwrap_or(50);
                let learning_rate = f64_param(params, "learning_rate")?.unwrap_or(1.0);
                let mut model = AdaBoostRegressor::new(n_estimators, learning_rate, seed);
                if let Some(depth) = usize_param(params, "max_depth")? {
                    model = model.with_max_depth(depth);
                }
                model.fit(x, y)?;
                Ok(FittedModel::AdaBoost(model))
            }
            Self::KNearest => {
                reject_unknown(params, &["n_neighbors"])?;
                let n_neighbors = usize_param(params, "n_neighbors")?.unwrap_or(5);
                let mut model = KnnRegressor::new(n_neighbors);
                model.fit(x, y)?;
                Ok(FittedModel::KNearest(model))
            }
        }
    }
}

/// A fitted predictor, serializable for persistence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FittedModel {
    Linear(LinearRegression),
    DecisionTree(DecisionTreeRegressor),
    RandomForest(RandomForestRegressor),
    GradientBoosting(GradientBoostingRegressor),
    AdaBoost(AdaBoostRegressor),
    KNearest(KnnRegressor),
}

impl FittedModel {
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        match self {
            Self::Linear(m) => m.predict(x),
            Self::DecisionTree(m) => m.predict(x),
            Self::RandomForest(m) => m.predict(x),
            Self::GradientBoosting(m) => m.predict(x),
            Self::AdaBoost(m) => m.predict(x),
            Self::KNearest(m) => m.predict(x),
        }
    }

    pub fn family(&self) -> ModelFamily {
        match self {
            Self::Linear(_) => ModelFamily::Linear,
            Self::DecisionTree(_) => ModelFamily::DecisionTree,
            Self::RandomForest(_) => ModelFamily::RandomForest,
            Self::GradientBoosting(_) => ModelFamily::GradientBoosting,
            Self::AdaBoost(_) => ModelFamily::AdaBoost,
            Self::KNearest(_) => ModelFamily::KNearest,
        }
    }
}

fn reject_unknown(params: &ParamMap, known: &[&str]) -> Result<()> {
    for key in params.keys() {
        if !known.contains(&key.as_str()) {
            return Err(AutomlError::TrainingError(format!(
                "unknown hyperparameter '{}'",
                key
            )));
        }
    }
    Ok(())
}

fn usize_param(params: &ParamMap, key: &str) -> Result<Option<usize>> {
    match params.get(key) {
        None => Ok(None),
        Some(value) => value.as_usize().map(Some).ok_or_else(|| {
            AutomlError::TrainingError(format!(
                "hyperparameter '{}' must be a non-negative integer, got {}",
                key, value
            ))
        }),
    }
}

fn f64_param(params: &ParamMap, key: &str) -> Result<Option<f64>> {
    match params.get(key) {
        None => Ok(None),
        Some(value) => value.as_f64().map(Some).ok_or_else(|| {
            AutomlError::TrainingError(format!(
                "hyperparameter '{}' must be numeric, got {}",
                key, value
            ))
        }),
    }
}

fn str_param<'a>(params: &'a ParamMap, key: &str) -> Result<Option<&'a str>> {
    match params.get(key) {
        None => Ok(None),
        Some(value) => value.as_str().map(Some).ok_or_else(|| {
            AutomlError::TrainingError(format!(
                "hyperparameter '{}' must be a string, got {}",
                key, value
            ))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamValue;
    use ndarray::array;

    #[test]
    fn test_family_fit_with_params() {
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0], [6.0]];
        let y = array![2.0, 4.0, 6.0, 8.0, 10.0, 12.0];
        let mut params = ParamMap::new();
        params.insert("n_neighbors".into(), ParamValue::Int(2));

        let fitted = ModelFamily::KNearest.fit(&x, &y, &params, 42).unwrap();
        assert_eq!(fitted.family(), ModelFamily::KNearest);
        assert_eq!(fitted.predict(&x).unwrap().len(), 6);
    }

    #[test]
    fn test_unknown_param_rejected() {
        let x = array![[1.0], [2.0]];
        let y = array![1.0, 2.0];
        let mut params = ParamMap::new();
        params.insert("bogus".into(), ParamValue::Int(1));
        let result = ModelFamily::Linear.fit(&x, &y, &params, 42);
        assert!(matches!(result, Err(AutomlError::TrainingError(_))));
    }

    #[test]
    fn test_ill_typed_param_rejected() {
        let x = array![[1.0], [2.0]];
        let y = array![1.0, 2.0];
        let mut params = ParamMap::new();
        params.insert("max_depth".into(), ParamValue::Str("deep".into()));
        let result = ModelFamily::DecisionTree.fit(&x, &y, &params, 42);
        assert!(matches!(result, Err(AutomlError::TrainingError(_))));
    }

    #[test]
    fn test_criterion_param_dispatch() {
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0], [6.0]];
        let y = array![1.0, 1.0, 1.0, 5.0, 5.0, 5.0];
        for name in ["squared_error", "friedman_mse", "absolute_error", "poisson"] {
            let mut params = ParamMap::new();
            params.insert("criterion".into(), ParamValue::Str(name.into()));
            let fitted = ModelFamily::DecisionTree.fit(&x, &y, &params, 42).unwrap();
            assert_eq!(fitted.family(), ModelFamily::DecisionTree, "{name}");
        }

        let mut params = ParamMap::new();
        params.insert("criterion".into(), ParamValue::Str("gini".into()));
        let result = ModelFamily::DecisionTree.fit(&x, &y, &params, 42);
        assert!(matches!(result, Err(AutomlError::TrainingError(_))));
    }

    #[test]
    fn test_adaboost_family_fit() {
        let x = Array2::from_shape_fn((30, 1), |(i, _)| i as f64);
        let y = Array1::from_shape_fn(30, |i| 3.0 * i as f64);
        let mut params = ParamMap::new();
        params.insert("n_estimators".into(), ParamValue::Int(16));
        params.insert("learning_rate".into(), ParamValue::Float(0.5));

        let fitted = ModelFamily::AdaBoost.fit(&x, &y, &params, 42).unwrap();
        assert_eq!(fitted.family(), ModelFamily::AdaBoost);
        assert_eq!(fitted.predict(&x).unwrap().len(), 30);
    }

    #[test]
    fn test_seeded_family_fit_is_deterministic() {
        let x = Array2::from_shape_fn((30, 2), |(i, j)| (i * 2 + j) as f64);
        let y = Array1::from_shape_fn(30, |i| i as f64);
        let mut params = ParamMap::new();
        params.insert("n_estimators".into(), ParamValue::Int(8));

        let a = ModelFamily::RandomForest.fit(&x, &y, &params, 42).unwrap();
        let b = ModelFamily::RandomForest.fit(&x, &y, &params, 42).unwrap();
        assert_eq!(a.predict(&x).unwrap(), b.predict(&x).unwrap());
    }
}
