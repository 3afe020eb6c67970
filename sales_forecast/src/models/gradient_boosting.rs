//! Gradient boosted regression trees under squared loss

use crate::error::{ForecastError, Result};
use crate::models::tree::{RegressionTree, TreeParams};
use crate::models::{validate_training_data, ModelKind, RegressionModel, TrainedRegressor};
use serde::{Deserialize, Serialize};

/// Gradient boosting model
#[derive(Debug, Clone)]
pub struct GradientBoosting {
    /// Number of boosting stages
    n_estimators: usize,
    /// Shrinkage applied to each stage
    learning_rate: f64,
    /// Growth limits of each stage's tree
    params: TreeParams,
}

/// Trained gradient boosting ensemble
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedGradientBoosting {
    n_features: usize,
    /// Initial prediction, the training target mean
    init: f64,
    learning_rate: f64,
    trees: Vec<RegressionTree>,
}

impl Default for GradientBoosting {
    fn default() -> Self {
        Self {
            n_estimators: 200,
            learning_rate: 0.05,
            params: TreeParams {
                max_depth: Some(3),
                ..TreeParams::default()
            },
        }
    }
}

impl GradientBoosting {
    /// Create a boosting model with custom stage count, shrinkage and depth
    pub fn new(n_estimators: usize, learning_rate: f64, max_depth: usize) -> Result<Self> {
        if n_estimators == 0 {
            return Err(ForecastError::InvalidParameter(
                "n_estimators must be positive".to_string(),
            ));
        }
        if !(learning_rate > 0.0 && learning_rate <= 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "learning_rate must be in (0, 1], got {}",
                learning_rate
            )));
        }
        if max_depth == 0 {
            return Err(ForecastError::InvalidParameter(
                "max_depth must be positive".to_string(),
            ));
        }

        Ok(Self {
            n_estimators,
            learning_rate,
            params: TreeParams {
                max_depth: Some(max_depth),
                ..TreeParams::default()
            },
        })
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }
}

impl RegressionModel for GradientBoosting {
    type Trained = TrainedGradientBoosting;

    fn train(&self, x: &[Vec<f64>], y: &[f64]) -> Result<Self::Trained> {
        let n_features = validate_training_data(self.kind(), x, y)?;
        let sample: Vec<usize> = (0..x.len()).collect();

        let init = y.iter().sum::<f64>() / y.len() as f64;
        let mut fitted = vec![init; y.len()];
        let mut trees = Vec::with_capacity(self.n_estimators);

        for _ in 0..self.n_estimators {
            // Negative gradient of squared loss
            let residuals: Vec<f64> = y.iter().zip(&fitted).map(|(t, f)| t - f).collect();
            let tree = RegressionTree::fit(x, &residuals, &sample, &self.params);

            for (f, row) in fitted.iter_mut().zip(x) {
                *f += self.learning_rate * tree.predict(row);
            }
            trees.push(tree);
        }

        Ok(TrainedGradientBoosting {
            n_features,
            init,
            learning_rate: self.learning_rate,
            trees,
        })
    }

    fn kind(&self) -> ModelKind {
        ModelKind::GradientBoosting
    }
}

impl TrainedGradientBoosting {
    pub fn stages(&self) -> usize {
        self.trees.len()
    }

    pub fn init(&self) -> f64 {
        self.init
    }
}

impl TrainedRegressor for TrainedGradientBoosting {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_unchecked(&self, row: &[f64]) -> f64 {
        self.init
            + self.learning_rate * self.trees.iter().map(|tree| tree.predict(row)).sum::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tests::linear_data;
    use approx::assert_relative_eq;
    use sales_math::root_mean_squared_error;

    #[test]
    fn test_more_stages_reduce_training_error() {
        let (x, y) = linear_data();
        let short = GradientBoosting::new(10, 0.05, 3).unwrap().train(&x, &y).unwrap();
        let long = GradientBoosting::default().train(&x, &y).unwrap();

        let short_rmse = root_mean_squared_error(&y, &short.predict(&x).unwrap()).unwrap();
        let long_rmse = root_mean_squared_error(&y, &long.predict(&x).unwrap()).unwrap();
        assert!(long_rmse < short_rmse);
        assert_eq!(long.stages(), 200);
    }

    #[test]
    fn test_constant_target_predicts_constant() {
        let x: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64]).collect();
        let y = vec![250.0; 10];

        let model = GradientBoosting::default().train(&x, &y).unwrap();

        assert_eq!(model.init(), 250.0);
        assert_relative_eq!(model.predict_row(&[3.0]).unwrap(), 250.0);
    }

    #[test]
    fn test_invalid_hyperparameters() {
        assert!(GradientBoosting::new(0, 0.1, 3).is_err());
        assert!(GradientBoosting::new(10, 0.0, 3).is_err());
        assert!(GradientBoosting::new(10, 0.1, 0).is_err());
    }
}
