//! Regression models for weekly sales
//!
//! Each model family has an untrained form holding its fixed
//! hyperparameters ([`RegressionModel`]) and a trained form that predicts
//! ([`TrainedRegressor`]). Trained models are persisted through the
//! [`TrainedModel`] enum.

use crate::error::{ForecastError, Result};
use crate::utils::{require_artifact, write_atomic};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub mod gradient_boosting;
pub mod linear;
pub mod random_forest;
pub mod tree;

pub use gradient_boosting::{GradientBoosting, TrainedGradientBoosting};
pub use linear::{LinearRegression, TrainedLinearRegression};
pub use random_forest::{RandomForest, TrainedRandomForest};

/// The three model families trained on every run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    LinearRegression,
    RandomForest,
    GradientBoosting,
}

/// Model served to the evaluator and forecaster.
///
/// A fixed business rule rather than the best scorer of a training run.
pub const PRODUCTION_MODEL: ModelKind = ModelKind::GradientBoosting;

impl ModelKind {
    /// Every family, in training order
    pub const ALL: [ModelKind; 3] = [
        ModelKind::LinearRegression,
        ModelKind::RandomForest,
        ModelKind::GradientBoosting,
    ];

    /// Name used in artifact file names and the metrics table
    pub fn name(&self) -> &'static str {
        match self {
            ModelKind::LinearRegression => "Linear_Regression",
            ModelKind::RandomForest => "Random_Forest",
            ModelKind::GradientBoosting => "Gradient_Boosting",
        }
    }

    /// File name used when this family is the production model
    pub fn production_file_name(&self) -> String {
        format!("{}_model.json", self.name().to_lowercase())
    }

    /// Fit this family with its fixed hyperparameters
    pub fn train(&self, x: &[Vec<f64>], y: &[f64]) -> Result<TrainedModel> {
        Ok(match self {
            ModelKind::LinearRegression => {
                TrainedModel::LinearRegression(LinearRegression::default().train(x, y)?)
            }
            ModelKind::RandomForest => {
                TrainedModel::RandomForest(RandomForest::default().train(x, y)?)
            }
            ModelKind::GradientBoosting => {
                TrainedModel::GradientBoosting(GradientBoosting::default().train(x, y)?)
            }
        })
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A fitted regressor over scaled feature rows
pub trait TrainedRegressor: Debug {
    /// Number of features each row must carry
    fn n_features(&self) -> usize;

    /// Predict for a row whose width has already been checked
    fn predict_unchecked(&self, row: &[f64]) -> f64;

    /// Predict weekly sales for one feature row
    fn predict_row(&self, row: &[f64]) -> Result<f64> {
        if row.len() != self.n_features() {
            return Err(ForecastError::ValidationError(format!(
                "Row has {} features, model expects {}",
                row.len(),
                self.n_features()
            )));
        }
        Ok(self.predict_unchecked(row))
    }

    /// Predict weekly sales for many feature rows
    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>> {
        rows.iter().map(|row| self.predict_row(row)).collect()
    }
}

/// A model family with fixed hyperparameters that can be trained
pub trait RegressionModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedRegressor;

    /// Fit on feature rows `x` and targets `y`
    fn train(&self, x: &[Vec<f64>], y: &[f64]) -> Result<Self::Trained>;

    /// Which family this is
    fn kind(&self) -> ModelKind;
}

/// Reject inputs no model can be fitted on
pub(crate) fn validate_training_data(kind: ModelKind, x: &[Vec<f64>], y: &[f64]) -> Result<usize> {
    let fail = |reason: String| -> Result<usize> { Err(ForecastError::model_fit(kind.name(), reason)) };

    if x.is_empty() {
        return fail("no training rows".to_string());
    }
    if x.len() != y.len() {
        return fail(format!("{} rows but {} targets", x.len(), y.len()));
    }
    let width = x[0].len();
    if width == 0 {
        return fail("rows have no features".to_string());
    }
    for (i, row) in x.iter().enumerate() {
        if row.len() != width {
            return fail(format!("row {} has {} features, expected {}", i, row.len(), width));
        }
        if row.iter().any(|v| !v.is_finite()) {
            return fail(format!("row {} contains a non-finite feature", i));
        }
    }
    if let Some(i) = y.iter().position(|v| !v.is_finite()) {
        return fail(format!("target {} is not finite", i));
    }

    Ok(width)
}

/// Any trained model, as persisted to disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model")]
pub enum TrainedModel {
    LinearRegression(TrainedLinearRegression),
    RandomForest(TrainedRandomForest),
    GradientBoosting(TrainedGradientBoosting),
}

impl TrainedModel {
    pub fn kind(&self) -> ModelKind {
        match self {
            TrainedModel::LinearRegression(_) => ModelKind::LinearRegression,
            TrainedModel::RandomForest(_) => ModelKind::RandomForest,
            TrainedModel::GradientBoosting(_) => ModelKind::GradientBoosting,
        }
    }

    /// Persist as JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_atomic(path.as_ref(), |writer| {
            serde_json::to_writer(writer, self)?;
            Ok(())
        })
    }

    /// Load a model written by [`TrainedModel::save`]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        require_artifact(path)?;
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

impl TrainedRegressor for TrainedModel {
    fn n_features(&self) -> usize {
        match self {
            TrainedModel::LinearRegression(m) => m.n_features(),
            TrainedModel::RandomForest(m) => m.n_features(),
            TrainedModel::GradientBoosting(m) => m.n_features(),
        }
    }

    fn predict_unchecked(&self, row: &[f64]) -> f64 {
        match self {
            TrainedModel::LinearRegression(m) => m.predict_unchecked(row),
            TrainedModel::RandomForest(m) => m.predict_unchecked(row),
            TrainedModel::GradientBoosting(m) => m.predict_unchecked(row),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::tempdir;

    pub(crate) fn linear_data() -> (Vec<Vec<f64>>, Vec<f64>) {
        let x: Vec<Vec<f64>> = (0..40)
            .map(|i| vec![i as f64 / 10.0, ((i * 7) % 11) as f64 / 5.0])
            .collect();
        let y = x.iter().map(|r| 3.0 * r[0] - 2.0 * r[1] + 10.0).collect();
        (x, y)
    }

    #[test]
    fn test_names() {
        assert_eq!(ModelKind::LinearRegression.name(), "Linear_Regression");
        assert_eq!(ModelKind::RandomForest.to_string(), "Random_Forest");
        assert_eq!(
            PRODUCTION_MODEL.production_file_name(),
            "gradient_boosting_model.json"
        );
    }

    #[rstest]
    #[case(ModelKind::LinearRegression)]
    #[case(ModelKind::RandomForest)]
    #[case(ModelKind::GradientBoosting)]
    fn test_every_kind_trains_and_persists(#[case] kind: ModelKind) {
        let (x, y) = linear_data();
        let model = kind.train(&x, &y).unwrap();
        assert_eq!(model.kind(), kind);
        assert_eq!(model.n_features(), 2);

        let dir = tempdir().unwrap();
        let path = dir.path().join(format!("{}.json", kind.name()));
        model.save(&path).unwrap();
        let loaded = TrainedModel::load(&path).unwrap();

        assert_eq!(loaded, model);
        assert_eq!(loaded.predict(&x).unwrap(), model.predict(&x).unwrap());
    }

    #[rstest]
    #[case(ModelKind::LinearRegression)]
    #[case(ModelKind::RandomForest)]
    #[case(ModelKind::GradientBoosting)]
    fn test_non_finite_input_fails_fit(#[case] kind: ModelKind) {
        let (mut x, y) = linear_data();
        x[3][1] = f64::NAN;

        let result = kind.train(&x, &y);
        assert!(matches!(result, Err(ForecastError::ModelFit { .. })));
    }

    #[test]
    fn test_empty_and_ragged_input_rejected() {
        assert!(validate_training_data(ModelKind::RandomForest, &[], &[]).is_err());
        let ragged = vec![vec![1.0, 2.0], vec![1.0]];
        assert!(validate_training_data(ModelKind::RandomForest, &ragged, &[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_predict_row_checks_width() {
        let (x, y) = linear_data();
        let model = ModelKind::LinearRegression.train(&x, &y).unwrap();

        assert!(matches!(
            model.predict_row(&[1.0]),
            Err(ForecastError::ValidationError(_))
        ));
    }

    #[test]
    fn test_missing_artifact() {
        let result = TrainedModel::load("/nonexistent/gradient_boosting_model.json");
        assert!(matches!(result, Err(ForecastError::MissingArtifact { .. })));
    }
}
