//! Single-feature ordinary least squares and regression metrics

use ndarray::Array1;
use pulse_core::{PipelineError, Result};
use serde::Serialize;

/// Variance below which the feature is treated as constant
const MIN_VARIANCE: f64 = 1e-12;

/// Fitted `y = intercept + coefficient * x`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearModel {
    pub coefficient: f64,
    pub intercept: f64,
}

impl LinearModel {
    /// Fit by least squares
    ///
    /// A constant feature carries no information: the coefficient is 0 and
    /// the intercept is the mean of `y`.
    pub fn fit(x: &Array1<f64>, y: &Array1<f64>) -> Result<Self> {
        if x.len() != y.len() {
            return Err(PipelineError::Other(format!(
                "Dimension mismatch: {} features, {} targets",
                x.len(),
                y.len()
            )));
        }
        let (Some(x_mean), Some(y_mean)) = (x.mean(), y.mean()) else {
            return Err(PipelineError::EmptyDataset("no rows to fit".to_string()));
        };

        let dx = x - x_mean;
        let dy = y - y_mean;
        let sxx = dx.dot(&dx);
        let sxy = dx.dot(&dy);

        let coefficient = if sxx < MIN_VARIANCE { 0.0 } else { sxy / sxx };
        Ok(Self {
            coefficient,
            intercept: y_mean - coefficient * x_mean,
        })
    }

    pub fn predict_one(&self, x: f64) -> f64 {
        self.intercept + self.coefficient * x
    }

    pub fn predict(&self, x: &Array1<f64>) -> Array1<f64> {
        x.mapv(|v| self.predict_one(v))
    }
}

/// Goodness of fit on a set of predictions
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegressionMetrics {
    /// Coefficient of determination; NaN when the targets are constant
    pub r2: f64,
    /// Mean squared error
    pub mse: f64,
    /// Mean absolute error
    pub mae: f64,
    pub n_samples: usize,
}

impl RegressionMetrics {
    pub fn calculate(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Self {
        Self {
            r2: r_squared(y_true, y_pred),
            mse: mean_squared_error(y_true, y_pred),
            mae: mean_absolute_error(y_true, y_pred),
            n_samples: y_true.len(),
        }
    }
}

/// Mean Squared Error: (1/n) * Σ(y_true - y_pred)²
pub fn mean_squared_error(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    let n = y_true.len() as f64;
    y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(&t, &p)| (t - p).powi(2))
        .sum::<f64>()
        / n
}

/// Mean Absolute Error: (1/n) * Σ|y_true - y_pred|
pub fn mean_absolute_error(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    let n = y_true.len() as f64;
    y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(&t, &p)| (t - p).abs())
        .sum::<f64>()
        / n
}

/// R² = 1 - SS_res / SS_tot
pub fn r_squared(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    let Some(y_mean) = y_true.mean() else {
        return f64::NAN;
    };
    let ss_tot: f64 = y_true.iter().map(|&t| (t - y_mean).powi(2)).sum();
    if ss_tot == 0.0 {
        return f64::NAN;
    }
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(&t, &p)| (t - p).powi(2))
        .sum();
    1.0 - ss_res / ss_tot
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_fit_exact_line() {
        let x = array![0.0, 1.0, 2.0, 3.0];
        let y = array![1.0, 3.0, 5.0, 7.0];
        let model = LinearModel::fit(&x, &y).unwrap();
        assert!((model.coefficient - 2.0).abs() < 1e-12);
        assert!((model.intercept - 1.0).abs() < 1e-12);
        assert!((model.predict_one(10.0) - 21.0).abs() < 1e-9);
    }

    #[test]
    fn test_fit_constant_feature() {
        let x = array![0.0, 0.0, 0.0];
        let y = array![1.0, 2.0, 6.0];
        let model = LinearModel::fit(&x, &y).unwrap();
        assert_eq!(model.coefficient, 0.0);
        assert!((model.intercept - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_fit_rejects_empty_and_mismatched() {
        let empty = Array1::<f64>::zeros(0);
        assert!(matches!(
            LinearModel::fit(&empty, &empty),
            Err(PipelineError::EmptyDataset(_))
        ));
        assert!(LinearModel::fit(&array![1.0], &array![1.0, 2.0]).is_err());
    }

    #[test]
    fn test_metrics() {
        let y_true = array![1.0, 2.0, 3.0];
        let y_pred = array![1.0, 2.0, 5.0];
        let metrics = RegressionMetrics::calculate(&y_true, &y_pred);
        assert!((metrics.mse - 4.0 / 3.0).abs() < 1e-12);
        assert!((metrics.mae - 2.0 / 3.0).abs() < 1e-12);
        assert!((metrics.r2 - (1.0 - 4.0 / 2.0)).abs() < 1e-12);
        assert_eq!(metrics.n_samples, 3);

        assert!(r_squared(&array![2.0], &array![1.0]).is_nan());
    }
}
