//! Winner selection
//!
//! Scans the search results for the maximum held-out r². Ties go to the
//! candidate appearing earliest in the registry's listed order, regardless
//! of the result map's iteration order. A winner below the quality
//! threshold terminates the run with `InsufficientAccuracy`.

use crate::data::Dataset;
use crate::error::{AutomlError, Result};
use crate::metrics::RegressionMetrics;
use crate::models::FittedModel;
use crate::params::{format_params, ParamMap};
use crate::registry::CandidateRegistry;
use crate::search::{SearchResult, DEFAULT_SEED};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

/// Default minimum-quality threshold on the winning r²
pub const DEFAULT_QUALITY_THRESHOLD: f64 = 0.6;

/// The selected winner: fitted predictor state plus its provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub candidate: String,
    pub params: ParamMap,
    pub model: FittedModel,
    pub metrics: RegressionMetrics,
}

/// Picks the single winning candidate from the search results
#[derive(Debug, Clone)]
pub struct Selector {
    threshold: f64,
    seed: u64,
}

impl Default for Selector {
    fn default() -> Self {
        Self::new()
    }
}

impl Selector {
    pub fn new() -> Self {
        Self {
            threshold: DEFAULT_QUALITY_THRESHOLD,
            seed: DEFAULT_SEED,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Seed for the winner re-fit; must match the search engine's seed so
    /// the re-fit reproduces the searched score.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Select the winner and re-fit it with its best hyperparameters.
    pub fn select(
        &self,
        registry: &CandidateRegistry,
        results: &BTreeMap<String, SearchResult>,
        train: &Dataset,
    ) -> Result<ModelArtifact> {
        let winner = self.pick_winner(registry, results)?;

        info!(
            candidate = %winner.candidate,
            score = winner.score,
            params = %format_params(&winner.params),
            "selected winning model"
        );

        let spec = registry.get(&winner.candidate).ok_or_else(|| {
            AutomlError::ValidationError(format!(
                "search result '{}' has no registry entry",
                winner.candidate
            ))
        })?;

        let model = spec
            .family
            .fit(train.features(), train.labels(), &winner.params, self.seed)
            .map_err(|e| {
                AutomlError::TrainingError(format!(
                    "winner '{}' failed to re-fit: {}",
                    winner.candidate, e
                ))
            })?;

        Ok(ModelArtifact {
            candidate: winner.candidate.clone(),
            params: winner.params.clone(),
            model,
            metrics: winner.metrics,
        })
    }

    /// First candidate in registry order achieving the maximum score, then
    /// the threshold gate.
    fn pick_winner<'a>(
        &self,
        registry: &CandidateRegistry,
        results: &'a BTreeMap<String, SearchResult>,
    ) -> Result<&'a SearchResult> {
        let mut best: Option<&SearchResult> = None;
        for spec in registry.list() {
            if let Some(result) = results.get(&spec.name) {
                // Strict comparison keeps the earliest candidate on ties
                if best.is_none_or(|b| result.score > b.score) {
                    best = Some(result);
                }
            }
        }

        let winner = best.ok_or(AutomlError::InsufficientAccuracy {
            best_score: f64::NEG_INFINITY,
        })?;

        if winner.score < self.threshold {
            return Err(AutomlError::InsufficientAccuracy {
                best_score: winner.score,
            });
        }
        Ok(winner)
    }
}
