//! Experiment tracking
//!
//! Records a run-scoped log of hyperparameters, metrics, and the winning
//! artifact. The tracking URI's scheme routes the record: `file` means a
//! purely local store (no model registry), anything else is treated as a
//! remote registry-capable endpoint and the winner is additionally
//! registered under its candidate name.
//!
//! Tracking and persistence are independent failure domains: every error
//! here surfaces as [`AutomlError::TrackingError`] and callers downgrade it
//! to a warning instead of aborting the run.

use crate::error::{AutomlError, Result};
use crate::selection::ModelArtifact;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

/// Tracking endpoint configuration, passed in explicitly at call time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Endpoint URI, e.g. `file://mlruns` or `https://tracker.example.com`
    pub uri: String,
    /// Logical experiment name runs are grouped under
    pub experiment: String,
    /// Timeout for remote calls
    #[serde(skip, default = "default_timeout")]
    pub timeout: Duration,
}

fn default_timeout() -> Duration {
    Duration::from_secs(5)
}

impl TrackingConfig {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            experiment: "model-selection".to_string(),
            timeout: default_timeout(),
        }
    }

    pub fn with_experiment(mut self, experiment: impl Into<String>) -> Self {
        self.experiment = experiment.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// URI scheme; a bare path counts as a local file store.
    pub fn scheme(&self) -> &str {
        match self.uri.find("://") {
            Some(idx) => &self.uri[..idx],
            None => "file",
        }
    }

    /// True when the endpoint is a purely local file-backed store, which
    /// cannot host a model registry.
    pub fn is_local_store(&self) -> bool {
        self.scheme() == "file"
    }

    /// Directory backing a local store URI.
    fn local_path(&self) -> PathBuf {
        let path = self.uri.strip_prefix("file://").unwrap_or(&self.uri);
        if path.is_empty() {
            PathBuf::from("mlruns")
        } else {
            PathBuf::from(path)
        }
    }
}

/// Run lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Running,
    Finished,
}

/// One logical tracked run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub run_id: String,
    pub experiment: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub status: RunStatus,
    pub params: BTreeMap<String, String>,
    pub metrics: BTreeMap<String, f64>,
    pub artifacts: Vec<String>,
    /// Set only when the endpoint supports a model registry
    pub registered_model: Option<String>,
}

impl RunRecord {
    pub fn log_param(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), value.into());
    }

    pub fn log_metric(&mut self, key: impl Into<String>, value: f64) {
        self.metrics.insert(key.into(), value);
    }

    pub fn log_artifact(&mut self, name: impl Into<String>) {
        self.artifacts.push(name.into());
    }
}

/// Records experiment runs against a configured endpoint
#[derive(Debug, Clone)]
pub struct ExperimentTracker {
    config: TrackingConfig,
}

impl ExperimentTracker {
    pub fn new(config: TrackingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrackingConfig {
        &self.config
    }

    /// Open a new run scope.
    pub fn start_run(&self) -> RunRecord {
        RunRecord {
            run_id: Uuid::new_v4().to_string(),
            experiment: self.config.experiment.clone(),
            start_time: Utc::now(),
            end_time: None,
            status: RunStatus::Running,
            params: BTreeMap::new(),
            metrics: BTreeMap::new(),
            artifacts: Vec::new(),
            registered_model: None,
        }
    }

    /// Build the run record for a winning artifact: every hyperparameter and
    /// each of the three metrics logged as individually named values, the
    /// artifact logged, and registration requested only for remote stores.
    pub fn build_selection_run(&self, artifact: &ModelArtifact) -> RunRecord {
        let mut run = self.start_run();
        for (key, value) in &artifact.params {
            run.log_param(key.clone(), value.to_string());
        }
        run.log_param("candidate", artifact.candidate.clone());
        run.log_metric("rmse", artifact.metrics.rmse);
        run.log_metric("mae", artifact.metrics.mae);
        if let Some(r2) = artifact.metrics.r2 {
            run.log_metric("r2", r2);
        }
        run.log_artifact("model");
        // Model registry does not work with a file store
        if !self.config.is_local_store() {
            run.registered_model = Some(artifact.candidate.clone());
        }
        run
    }

    /// Record the winning artifact end to end.
    pub fn log_selection(&self, artifact: &ModelArtifact) -> Result<()> {
        let run = self.build_selection_run(artifact);
        self.finish_run(run)
    }

    /// Close the run scope and deliver the record to the endpoint.
    pub fn finish_run(&self, mut run: RunRecord) -> Result<()> {
        run.end_time = Some(Utc::now());
        run.status = RunStatus::Finished;

        if self.config.is_local_store() {
            self.write_local(&run)
        } else {
            self.post_remote(&run)
        }
    }

    fn write_local(&self, run: &RunRecord) -> Result<()> {
        let dir = self.config.local_path().join(&run.experiment);
        std::fs::create_dir_all(&dir)
            .map_err(|e| AutomlError::TrackingError(format!("cannot create run store: {}", e)))?;
        let path = dir.join(format!("{}.json", run.run_id));
        let json = serde_json::to_string_pretty(run)
            .map_err(|e| AutomlError::TrackingError(e.to_string()))?;
        std::fs::write(&path, json)
            .map_err(|e| AutomlError::TrackingError(format!("cannot write run record: {}", e)))?;
        info!(run_id = %run.run_id, path = %path.display(), "run recorded to local store");
        Ok(())
    }

    fn post_remote(&self, run: &RunRecord) -> Result<()> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.config.timeout)
            .build()
            .map_err(|e| AutomlError::TrackingError(e.to_string()))?;

        let runs_url = format!("{}/runs", self.config.uri.trim_end_matches('/'));
        client
            .post(&runs_url)
            .json(run)
            .send()
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| {
                AutomlError::TrackingError(format!("tracking endpoint unreachable: {}", e))
            })?;

        if let Some(name) = &run.registered_model {
            let register_url = format!(
                "{}/registered-models",
                self.config.uri.trim_end_matches('/')
            );
            let body =
                serde_json::json!({ "name": name, "run_id": run.run_id });
            client
                .post(&register_url)
                .json(&body)
                .send()
                .and_then(|resp| resp.error_for_status())
                .map_err(|e| {
                    AutomlError::TrackingError(format!("model registration failed: {}", e))
                })?;
            info!(model = %name, run_id = %run.run_id, "model registered");
        }

        info!(run_id = %run.run_id, url = %runs_url, "run recorded to remote tracker");
        Ok(())
    }
}
