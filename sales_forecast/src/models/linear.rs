//! Ordinary least squares linear regression

use crate::error::{ForecastError, Result};
use crate::models::{validate_training_data, ModelKind, RegressionModel, TrainedRegressor};
use linfa::dataset::Dataset;
use linfa::traits::Fit;
use linfa_linear::LinearRegression as LeastSquares;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Linear regression with an intercept
#[derive(Debug, Clone)]
pub struct LinearRegression {
    /// Tikhonov penalty on the feature coefficients (not the intercept)
    ridge_lambda: f64,
}

/// Trained linear regression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedLinearRegression {
    intercept: f64,
    coefficients: Vec<f64>,
}

impl Default for LinearRegression {
    fn default() -> Self {
        // Small enough to leave well-posed fits unchanged, large enough to
        // make constant and collinear columns solvable.
        Self { ridge_lambda: 1e-6 }
    }
}

impl LinearRegression {
    /// Create a linear regression with an explicit ridge penalty
    pub fn with_ridge(ridge_lambda: f64) -> Result<Self> {
        if !(ridge_lambda >= 0.0 && ridge_lambda.is_finite()) {
            return Err(ForecastError::InvalidParameter(format!(
                "ridge penalty must be a non-negative number, got {}",
                ridge_lambda
            )));
        }
        Ok(Self { ridge_lambda })
    }

    /// Design matrix `[1 | X]`, with `sqrt(lambda) * I` rows appended under
    /// the feature block when a penalty is set.
    fn design(&self, x: &[Vec<f64>], y: &[f64], width: usize) -> (Array2<f64>, Array1<f64>) {
        let n = x.len();
        let extra = if self.ridge_lambda > 0.0 { width } else { 0 };
        let sqrt_l = self.ridge_lambda.sqrt();

        let mut design = Array2::<f64>::zeros((n + extra, width + 1));
        for (i, row) in x.iter().enumerate() {
            design[[i, 0]] = 1.0;
            for (j, v) in row.iter().enumerate() {
                design[[i, j + 1]] = *v;
            }
        }
        for j in 0..extra {
            design[[n + j, j + 1]] = sqrt_l;
        }

        let mut target = Array1::<f64>::zeros(n + extra);
        for (i, v) in y.iter().enumerate() {
            target[i] = *v;
        }

        (design, target)
    }
}

impl RegressionModel for LinearRegression {
    type Trained = TrainedLinearRegression;

    fn train(&self, x: &[Vec<f64>], y: &[f64]) -> Result<Self::Trained> {
        let width = validate_training_data(self.kind(), x, y)?;
        let (design, target) = self.design(x, y, width);

        // The intercept lives in column 0 of the design, so linfa fits without its own
        let fitted = LeastSquares::new()
            .with_intercept(false)
            .fit(&Dataset::new(design, target))
            .map_err(|e| ForecastError::model_fit(self.kind().name(), format!("{:?}", e)))?;

        let params = fitted.params().to_vec();
        if params.len() != width + 1 || params.iter().any(|p| !p.is_finite()) {
            return Err(ForecastError::model_fit(
                self.kind().name(),
                "least squares produced non-finite coefficients",
            ));
        }

        Ok(TrainedLinearRegression {
            intercept: params[0],
            coefficients: params[1..].to_vec(),
        })
    }

    fn kind(&self) -> ModelKind {
        ModelKind::LinearRegression
    }
}

impl TrainedLinearRegression {
    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }
}

impl TrainedRegressor for TrainedLinearRegression {
    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn predict_unchecked(&self, row: &[f64]) -> f64 {
        self.intercept
            + row
                .iter()
                .zip(&self.coefficients)
                .map(|(x, b)| x * b)
                .sum::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tests::linear_data;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_recovers_coefficients() {
        let (x, y) = linear_data();
        let model = LinearRegression::default().train(&x, &y).unwrap();

        assert_abs_diff_eq!(model.intercept(), 10.0, epsilon = 1e-4);
        assert_abs_diff_eq!(model.coefficients()[0], 3.0, epsilon = 1e-4);
        assert_abs_diff_eq!(model.coefficients()[1], -2.0, epsilon = 1e-4);
        assert_abs_diff_eq!(model.predict_row(&[1.0, 1.0]).unwrap(), 11.0, epsilon = 1e-3);
    }

    #[test]
    fn test_constant_and_duplicate_columns_still_fit() {
        // Column 1 is all zeros and column 2 duplicates column 0
        let x: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64, 0.0, i as f64]).collect();
        let y: Vec<f64> = (0..20).map(|i| 5.0 + 2.0 * i as f64).collect();

        let model = LinearRegression::default().train(&x, &y).unwrap();
        let predictions = model.predict(&x).unwrap();

        for (p, t) in predictions.iter().zip(&y) {
            assert_abs_diff_eq!(*p, *t, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_negative_ridge_rejected() {
        assert!(LinearRegression::with_ridge(-1.0).is_err());
        assert!(LinearRegression::with_ridge(0.0).is_ok());
    }
}
