//! Ordinary least squares linear regression
//!
//! Solves the normal equations with a Cholesky decomposition; near-singular
//! design matrices get a small ridge jitter before the solve is retried.

use crate::error::{AutomlError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Linear regression model (no hyperparameters)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearRegression {
    coefficients: Array1<f64>,
    intercept: f64,
    fitted: bool,
}

impl Default for LinearRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearRegression {
    pub fn new() -> Self {
        Self {
            coefficients: Array1::zeros(0),
            intercept: 0.0,
            fitted: false,
        }
    }

    /// Fit on the normal equations `(X'X) w = X'y` with an intercept column.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n = x.nrows();
        let p = x.ncols();
        if n != y.len() {
            return Err(AutomlError::ShapeError {
                expected: format!("{} labels", n),
                actual: format!("{} labels", y.len()),
            });
        }
        if n == 0 {
            return Err(AutomlError::TrainingError(
                "cannot fit linear regression on zero samples".into(),
            ));
        }

        // Augmented design matrix: [X | 1]
        let mut gram = Array2::zeros((p + 1, p + 1));
        let mut rhs = Array1::zeros(p + 1);
        for row in 0..n {
            for i in 0..=p {
                let xi = if i < p { x[[row, i]] } else { 1.0 };
                rhs[i] += xi * y[row];
                for j in i..=p {
                    let xj = if j < p { x[[row, j]] } else { 1.0 };
                    gram[[i, j]] += xi * xj;
                }
            }
        }
        // Mirror the upper triangle
        for i in 0..=p {
            for j in 0..i {
                gram[[i, j]] = gram[[j, i]];
            }
        }

        let solution = cholesky_solve(&gram, &rhs, 0.0)
            .or_else(|| {
                // Near-singular: regularize the diagonal and retry once
                let jitter =
                    1e-8 * gram.diag().iter().map(|v| v.abs()).sum::<f64>() / (p + 1) as f64;
                cholesky_solve(&gram, &rhs, jitter.max(1e-12))
            })
            .ok_or_else(|| {
                AutomlError::TrainingError("singular design matrix in linear regression".into())
            })?;

        self.intercept = solution[p];
        self.coefficients = solution.slice(ndarray::s![..p]).to_owned();
        self.fitted = true;
        Ok(())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.fitted {
            return Err(AutomlError::ModelNotFitted);
        }
        if x.ncols() != self.coefficients.len() {
            return Err(AutomlError::ShapeError {
                expected: format!("{} features", self.coefficients.len()),
                actual: format!("{} features", x.ncols()),
            });
        }
        Ok(x.dot(&self.coefficients) + self.intercept)
    }
}

/// Solve the symmetric positive-definite system `(A + ridge*I) x = b`.
/// Returns `None` when the (regularized) matrix is not positive definite.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>, ridge: f64) -> Option<Array1<f64>> {
    let n = a.nrows();
    if n != a.ncols() || n != b.len() {
        return None;
    }

    let mut l = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }
            if i == j {
                let diag = a[[i, i]] + ridge - sum;
                if diag <= 0.0 || !diag.is_finite() {
                    return None;
                }
                l[[i, i]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // Forward: L z = b
    let mut z = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * z[j];
        }
        z[i] = (b[i] - sum) / l[[i, i]];
    }

    // Backward: L' x = z
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * x[j];
        }
        x[i] = (z[i] - sum) / l[[i, i]];
    }

    Some(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_exact_linear_relation() {
        // y = 2*x0 - x1 + 3
        let x = array![
            [1.0, 0.0],
            [0.0, 1.0],
            [2.0, 1.0],
            [3.0, 2.0],
            [1.0, 4.0],
            [5.0, 1.0]
        ];
        let y = x.map_axis(ndarray::Axis(1), |row| 2.0 * row[0] - row[1] + 3.0);

        let mut model = LinearRegression::new();
        model.fit(&x, &y).unwrap();
        let pred = model.predict(&x).unwrap();
        for (p, t) in pred.iter().zip(y.iter()) {
            assert!((p - t).abs() < 1e-8, "pred {} vs true {}", p, t);
        }
    }

    #[test]
    fn test_predict_before_fit() {
        let model = LinearRegression::new();
        let result = model.predict(&array![[1.0, 2.0]]);
        assert!(matches!(result, Err(AutomlError::ModelNotFitted)));
    }

    #[test]
    fn test_collinear_columns_still_fit() {
        // Second column is a multiple of the first; jittered retry handles it
        let x = array![[1.0, 2.0], [2.0, 4.0], [3.0, 6.0], [4.0, 8.0]];
        let y = array![1.0, 2.0, 3.0, 4.0];
        let mut model = LinearRegression::new();
        model.fit(&x, &y).unwrap();
        let pred = model.predict(&x).unwrap();
        for (p, t) in pred.iter().zip(y.iter()) {
            assert!((p - t).abs() < 1e-4);
        }
    }
}
