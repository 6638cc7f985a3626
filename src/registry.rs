//! Candidate catalog
//!
//! The registry is a static, ordered catalog of model families with their
//! hyperparameter grids. Order is significant: it is the tie-break authority
//! for selection. Candidates are defined once at process start and are
//! immutable for the duration of a run.

use crate::error::{AutomlError, Result};
use crate::models::ModelFamily;
use crate::params::{ParamGrid, ParamValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One catalog entry: a named model family with its search grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateSpec {
    pub name: String,
    pub family: ModelFamily,
    pub grid: ParamGrid,
}

impl CandidateSpec {
    pub fn new(name: impl Into<String>, family: ModelFamily, grid: ParamGrid) -> Self {
        Self {
            name: name.into(),
            family,
            grid,
        }
    }
}

/// Ordered, immutable candidate catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateRegistry {
    candidates: Vec<CandidateSpec>,
}

impl CandidateRegistry {
    /// Build a registry, validating that it is non-empty with unique names.
    pub fn new(candidates: Vec<CandidateSpec>) -> Result<Self> {
        if candidates.is_empty() {
            return Err(AutomlError::ValidationError(
                "candidate registry must not be empty".into(),
            ));
        }
        let mut seen = BTreeSet::new();
        for spec in &candidates {
            if !seen.insert(spec.name.as_str()) {
                return Err(AutomlError::ValidationError(format!(
                    "duplicate candidate name '{}'",
                    spec.name
                )));
            }
        }
        Ok(Self { candidates })
    }

    /// The ordered candidate sequence. Position in this slice is the
    /// tie-break rank.
    pub fn list(&self) -> &[CandidateSpec] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&CandidateSpec> {
        self.candidates.iter().find(|c| c.name == name)
    }

    /// The default catalog: the regression family lineup with the grids the
    /// engine has always searched.
    pub fn default_catalog() -> Self {
        let estimator_counts = || {
            vec![
                ParamValue::Int(8),
                ParamValue::Int(16),
                ParamValue::Int(32),
                ParamValue::Int(64),
                ParamValue::Int(128),
                ParamValue::Int(256),
            ]
        };
        let boosting_rates = vec![
            ParamValue::Float(0.1),
            ParamValue::Float(0.01),
            ParamValue::Float(0.05),
            ParamValue::Float(0.001),
        ];
        let adaboost_rates = vec![
            ParamValue::Float(0.1),
            ParamValue::Float(0.01),
            ParamValue::Float(0.5),
            ParamValue::Float(0.001),
        ];
        let subsamples = vec![
            ParamValue::Float(0.6),
            ParamValue::Float(0.7),
            ParamValue::Float(0.75),
            ParamValue::Float(0.8),
            ParamValue::Float(0.85),
            ParamValue::Float(0.9),
        ];

        let candidates = vec![
            CandidateSpec::new(
                "Random Forest",
                ModelFamily::RandomForest,
                ParamGrid::new().with_dim("n_estimators", estimator_counts()),
            ),
            CandidateSpec::new(
                "Decision Tree",
                ModelFamily::DecisionTree,
                ParamGrid::new().with_dim(
                    "criterion",
                    vec![
                        ParamValue::Str("squared_error".into()),
                        ParamValue::Str("friedman_mse".into()),
                        ParamValue::Str("absolute_error".into()),
                        ParamValue::Str("poisson".into()),
                    ],
                ),
            ),
            CandidateSpec::new(
                "Gradient Boosting",
                ModelFamily::GradientBoosting,
                ParamGrid::new()
                    .with_dim("learning_rate", boosting_rates)
                    .with_dim("subsample", subsamples)
                    .with_dim("n_estimators", estimator_counts()),
            ),
            CandidateSpec::new(
                "AdaBoost Regressor",
                ModelFamily::AdaBoost,
                ParamGrid::new()
                    .with_dim("learning_rate", adaboost_rates)
                    .with_dim("n_estimators", estimator_counts()),
            ),
            CandidateSpec::new("Linear Regression", ModelFamily::Linear, ParamGrid::new()),
            CandidateSpec::new(
                "K-Nearest Neighbors",
                ModelFamily::KNearest,
                ParamGrid::new().with_dim(
                    "n_neighbors",
                    vec![
                        ParamValue::Int(3),
                        ParamValue::Int(5),
                        ParamValue::Int(7),
                        ParamValue::Int(9),
                    ],
                ),
            ),
        ];

        // Static catalog with unique literal names; cannot fail validation
        Self::new(candidates).expect("default catalog is valid")
    }
}
