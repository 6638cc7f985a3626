//! Exhaustive hyperparameter search
//!
//! For every candidate, fits each combination of its grid on the training
//! set and scores it on the held-out test set. r² governs the ranking;
//! rmse/mae ride along for reporting. One candidate and one combination at a
//! time, so peak memory stays at a single fitted model.

use crate::data::Dataset;
use crate::error::{AutomlError, Result};
use crate::metrics::{eval_metrics, RegressionMetrics};
use crate::models::ModelFamily;
use crate::params::{format_params, ParamMap};
use crate::registry::CandidateRegistry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Default seed injected into stochastic model families
pub const DEFAULT_SEED: u64 = 42;

/// Best configuration found for one candidate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub candidate: String,
    pub params: ParamMap,
    /// Held-out r² of the best combination
    pub score: f64,
    pub metrics: RegressionMetrics,
}

/// Grid search over the candidate registry
#[derive(Debug, Clone)]
pub struct SearchEngine {
    seed: u64,
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchEngine {
    pub fn new() -> Self {
        Self { seed: DEFAULT_SEED }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Run the search. Returns one [`SearchResult`] per candidate that had at
    /// least one scoreable combination; candidates whose every combination
    /// failed are dropped with a warning.
    pub fn run(
        &self,
        registry: &CandidateRegistry,
        train: &Dataset,
        test: &Dataset,
    ) -> Result<BTreeMap<String, SearchResult>> {
        if registry.is_empty() {
            return Err(AutomlError::ValidationError(
                "candidate registry must not be empty".into(),
            ));
        }
        Dataset::check_compatible(train, test)?;

        let mut results = BTreeMap::new();

        for spec in registry.list() {
            let mut best: Option<SearchResult> = None;
            let mut failures = 0usize;

            for params in spec.grid.combinations() {
                match self.score_combination(spec.family, &params, train, test) {
                    Ok(Some((score, metrics))) => {
                        if best.as_ref().is_none_or(|b| score > b.score) {
                            best = Some(SearchResult {
                                candidate: spec.name.clone(),
                                params,
                                score,
                                metrics,
                            });
                        }
                    }
                    Ok(None) => {
                        failures += 1;
                        debug!(
                            candidate = %spec.name,
                            params = %format_params(&params),
                            "combination unscoreable, skipping"
                        );
                    }
                    Err(err) => {
                        failures += 1;
                        debug!(
                            candidate = %spec.name,
                            params = %format_params(&params),
                            error = %err,
                            "combination failed, skipping"
                        );
                    }
                }
            }

            match best {
                Some(result) => {
                    info!(
                        candidate = %spec.name,
                        score = result.score,
                        params = %format_params(&result.params),
                        "best combination"
                    );
                    results.insert(spec.name.clone(), result);
                }
                None => {
                    warn!(
                        candidate = %spec.name,
                        failures,
                        "all combinations failed, dropping candidate"
                    );
                }
            }
        }

        Ok(results)
    }

    /// Fit and score one combination. `Ok(None)` means the fit succeeded but
    /// the configuration is unscoreable (undefined or non-finite r²).
    fn score_combination(
        &self,
        family: ModelFamily,
        params: &ParamMap,
        train: &Dataset,
        test: &Dataset,
    ) -> Result<Option<(f64, RegressionMetrics)>> {
        let fitted = family.fit(train.features(), train.labels(), params, self.seed)?;
        let predictions = fitted.predict(test.features())?;
        let metrics = eval_metrics(test.labels(), &predictions)?;
        match metrics.r2 {
            Some(score) if score.is_finite() => Ok(Some((score, metrics))),
            _ => Ok(None),
        }
    }
}
