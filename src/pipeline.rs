//! Training pipeline orchestration
//!
//! Runs the whole selection pass: validate inputs, search the catalog,
//! select the winner, record the experiment, persist the artifacts, and
//! return the winner's held-out r². The preprocessing object from the
//! transformation stage is treated as opaque and persisted unchanged.
//!
//! Artifact file names keep the `.pkl` defaults of the surrounding pipeline
//! stages; the payload is bincode.

use crate::data::Dataset;
use crate::error::{AutomlError, Result};
use crate::metrics::eval_metrics;
use crate::persist::save_object;
use crate::registry::CandidateRegistry;
use crate::search::{SearchEngine, DEFAULT_SEED};
use crate::selection::{Selector, DEFAULT_QUALITY_THRESHOLD};
use crate::tracking::{ExperimentTracker, TrackingConfig};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Minimum-quality threshold on the winning r²
    pub threshold: f64,
    /// Seed for stochastic model families
    pub seed: u64,
    /// Experiment tracking endpoint
    pub tracking: TrackingConfig,
    /// Destination for the winning predictor
    pub model_path: PathBuf,
    /// Destination for the pass-through preprocessing object
    pub preprocessor_path: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_QUALITY_THRESHOLD,
            seed: DEFAULT_SEED,
            tracking: TrackingConfig::new("file://mlruns"),
            model_path: PathBuf::from("artifacts/model.pkl"),
            preprocessor_path: PathBuf::from("artifacts/preprocessor.pkl"),
        }
    }
}

/// End-to-end model selection run
#[derive(Debug, Clone)]
pub struct TrainPipeline {
    config: PipelineConfig,
    registry: CandidateRegistry,
}

impl TrainPipeline {
    /// Pipeline over the default candidate catalog.
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            registry: CandidateRegistry::default_catalog(),
        }
    }

    /// Pipeline over a caller-supplied catalog.
    pub fn with_registry(config: PipelineConfig, registry: CandidateRegistry) -> Self {
        Self { config, registry }
    }

    pub fn registry(&self) -> &CandidateRegistry {
        &self.registry
    }

    /// Run selection on a train/test pair. Returns the winner's held-out r².
    pub fn run(&self, train: &Dataset, test: &Dataset) -> Result<f64> {
        self.run_with_preprocessor::<()>(train, test, None)
    }

    /// Like [`run`](Self::run), also persisting the opaque preprocessing
    /// object from the transformation stage before training begins.
    pub fn run_with_preprocessor<P: Serialize>(
        &self,
        train: &Dataset,
        test: &Dataset,
        preprocessor: Option<&P>,
    ) -> Result<f64> {
        Dataset::check_compatible(train, test)?;
        info!(
            candidates = self.registry.len(),
            train_rows = train.n_rows(),
            test_rows = test.n_rows(),
            "starting model selection"
        );

        if let Some(preprocessor) = preprocessor {
            save_object(&self.config.preprocessor_path, preprocessor)?;
        }

        let engine = SearchEngine::new().with_seed(self.config.seed);
        let results = engine.run(&self.registry, train, test)?;

        let selector = Selector::new()
            .with_threshold(self.config.threshold)
            .with_seed(self.config.seed);
        let artifact = selector.select(&self.registry, &results, train)?;

        // Tracking failures never block persistence
        let tracker = ExperimentTracker::new(self.config.tracking.clone());
        if let Err(err) = tracker.log_selection(&artifact) {
            warn!(error = %err, "experiment tracking failed, continuing");
        }

        save_object(&self.config.model_path, &artifact)?;

        let predictions = artifact.model.predict(test.features())?;
        let final_metrics = eval_metrics(test.labels(), &predictions)?;
        let score = final_metrics
            .r2
            .ok_or(AutomlError::InsufficientAccuracy {
                best_score: f64::NEG_INFINITY,
            })?;

        info!(
            candidate = %artifact.candidate,
            r2 = score,
            rmse = final_metrics.rmse,
            mae = final_metrics.mae,
            "model selection finished"
        );
        Ok(score)
    }
}
