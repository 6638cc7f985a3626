//! automl-select - Model selection engine for tabular regression
//!
//! Searches a fixed catalog of model families, tunes each family's
//! hyperparameter grid against held-out data, selects the best candidate
//! with a deterministic tie-break, records the experiment, and persists the
//! winning predictor for later reuse.
//!
//! # Modules
//!
//! ## Selection engine
//! - [`registry`] - Ordered candidate catalog with hyperparameter grids
//! - [`search`] - Exhaustive per-candidate grid search
//! - [`selection`] - Winner selection, tie-break, quality threshold
//! - [`metrics`] - Regression scoring (rmse, mae, r²)
//!
//! ## Model families
//! - [`models`] - Linear, decision tree, random forest, gradient boosting,
//!   adaboost, k-nearest neighbors
//!
//! ## Infrastructure
//! - [`tracking`] - Run-scoped experiment tracking and model registry
//! - [`persist`] - Atomic artifact serialization
//! - [`pipeline`] - End-to-end training run orchestration
//! - [`data`] - Validated dataset inputs
//! - [`loading`] - CSV bridge for the CLI entry point

pub mod error;

pub mod data;
pub mod metrics;
pub mod params;

pub mod models;
pub mod registry;
pub mod search;
pub mod selection;

pub mod persist;
pub mod tracking;

pub mod loading;
pub mod pipeline;

pub use error::{AutomlError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::data::Dataset;
    pub use crate::error::{AutomlError, Result};
    pub use crate::metrics::{eval_metrics, RegressionMetrics};
    pub use crate::models::{FittedModel, ModelFamily};
    pub use crate::params::{ParamGrid, ParamMap, ParamValue};
    pub use crate::persist::{load_object, save_object};
    pub use crate::pipeline::{PipelineConfig, TrainPipeline};
    pub use crate::registry::{CandidateRegistry, CandidateSpec};
    pub use crate::search::{SearchEngine, SearchResult};
    pub use crate::selection::{ModelArtifact, Selector, DEFAULT_QUALITY_THRESHOLD};
    pub use crate::tracking::{ExperimentTracker, RunRecord, TrackingConfig};
}
