//! Regression evaluation metrics

use crate::error::{AutomlError, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// The metric triple computed for every scored configuration.
///
/// `r2` is `None` when the actual labels have zero variance: the coefficient
/// of determination is undefined there, and callers must treat the
/// configuration as unscoreable instead of failing the run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    /// Root mean squared error, always >= 0
    pub rmse: f64,
    /// Mean absolute error, always >= 0
    pub mae: f64,
    /// Coefficient of determination, <= 1; `None` when undefined
    pub r2: Option<f64>,
}

/// Compute (rmse, mae, r2) for actual vs. predicted label vectors.
pub fn eval_metrics(actual: &Array1<f64>, predicted: &Array1<f64>) -> Result<RegressionMetrics> {
    if actual.len() != predicted.len() {
        return Err(AutomlError::ShapeError {
            expected: format!("{} predictions", actual.len()),
            actual: format!("{} predictions", predicted.len()),
        });
    }
    if actual.is_empty() {
        return Err(AutomlError::ValidationError(
            "cannot evaluate metrics on empty vectors".into(),
        ));
    }

    let n = actual.len() as f64;
    let errors: Vec<f64> = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| a - p)
        .collect();

    let mse = errors.iter().map(|e| e * e).sum::<f64>() / n;
    let rmse = mse.sqrt();
    let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;

    let mean = actual.iter().sum::<f64>() / n;
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
    let ss_res: f64 = errors.iter().map(|e| e.powi(2)).sum();

    let r2 = if ss_tot > 0.0 {
        Some(1.0 - ss_res / ss_tot)
    } else {
        None
    };

    Ok(RegressionMetrics { rmse, mae, r2 })
}
