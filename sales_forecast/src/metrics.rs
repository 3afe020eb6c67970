//! Model comparison and evaluation reports

use crate::error::Result;
use crate::models::ModelKind;
use crate::utils::{require_artifact, write_atomic};
use sales_math::RegressionMetrics;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Number of (actual, predicted) pairs kept in an evaluation report
pub const SAMPLE_SIZE: usize = 10;

/// One row of the model comparison table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    #[serde(rename = "Model")]
    pub model: String,
    #[serde(rename = "RMSE")]
    pub rmse: f64,
    #[serde(rename = "MAE")]
    pub mae: f64,
    #[serde(rename = "R2")]
    pub r2: f64,
}

impl MetricsRecord {
    pub fn new(kind: ModelKind, metrics: RegressionMetrics) -> Self {
        Self {
            model: kind.name().to_string(),
            rmse: metrics.rmse,
            mae: metrics.mae,
            r2: metrics.r2,
        }
    }

    pub fn metrics(&self) -> RegressionMetrics {
        RegressionMetrics {
            rmse: self.rmse,
            mae: self.mae,
            r2: self.r2,
        }
    }
}

/// Held-out metrics of every trained model, best RMSE first
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelComparison {
    records: Vec<MetricsRecord>,
}

impl ModelComparison {
    /// Build a comparison, sorting by ascending RMSE
    pub fn new(mut records: Vec<MetricsRecord>) -> Self {
        records.sort_by(|a, b| a.rmse.total_cmp(&b.rmse));
        Self { records }
    }

    pub fn records(&self) -> &[MetricsRecord] {
        &self.records
    }

    /// The lowest-RMSE model, if any were scored
    pub fn best(&self) -> Option<&MetricsRecord> {
        self.records.first()
    }

    /// Record for one model family
    pub fn get(&self, kind: ModelKind) -> Option<&MetricsRecord> {
        self.records.iter().find(|r| r.model == kind.name())
    }

    /// Write as CSV with the header `Model,RMSE,MAE,R2`
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_atomic(path.as_ref(), |writer| {
            let mut csv_writer = csv::Writer::from_writer(writer);
            for record in &self.records {
                csv_writer.serialize(record)?;
            }
            csv_writer.flush()?;
            Ok(())
        })
    }

    /// Read a table written by [`ModelComparison::write_csv`]
    pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        require_artifact(path)?;

        let mut reader = csv::Reader::from_path(path)?;
        let records = reader
            .deserialize()
            .collect::<std::result::Result<Vec<MetricsRecord>, csv::Error>>()?;
        Ok(Self::new(records))
    }
}

impl fmt::Display for ModelComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for record in &self.records {
            writeln!(f, "{:<18} {}", record.model, record.metrics())?;
        }
        Ok(())
    }
}

/// Result of re-scoring the production model on the held-out rows
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationReport {
    pub model: ModelKind,
    pub metrics: RegressionMetrics,
    /// Leading (actual, predicted) pairs of the test slice
    pub samples: Vec<(f64, f64)>,
}

impl EvaluationReport {
    /// Score `predicted` against `actual`, keeping the first few pairs as samples
    pub fn new(model: ModelKind, actual: &[f64], predicted: &[f64]) -> Result<Self> {
        let metrics = RegressionMetrics::evaluate(actual, predicted)?;
        let samples = actual
            .iter()
            .copied()
            .zip(predicted.iter().copied())
            .take(SAMPLE_SIZE)
            .collect();

        Ok(Self {
            model,
            metrics,
            samples,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    fn record(kind: ModelKind, rmse: f64) -> MetricsRecord {
        MetricsRecord::new(
            kind,
            RegressionMetrics {
                rmse,
                mae: rmse / 2.0,
                r2: 0.5,
            },
        )
    }

    #[test]
    fn test_comparison_sorted_by_rmse() {
        let comparison = ModelComparison::new(vec![
            record(ModelKind::LinearRegression, 30.0),
            record(ModelKind::RandomForest, 10.0),
            record(ModelKind::GradientBoosting, 20.0),
        ]);

        let order: Vec<&str> = comparison.records().iter().map(|r| r.model.as_str()).collect();
        assert_eq!(order, vec!["Random_Forest", "Gradient_Boosting", "Linear_Regression"]);
        assert_eq!(comparison.best().unwrap().rmse, 10.0);
        assert_eq!(comparison.get(ModelKind::LinearRegression).unwrap().rmse, 30.0);
    }

    #[test]
    fn test_csv_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model_performance_metrics.csv");
        let comparison = ModelComparison::new(vec![
            record(ModelKind::GradientBoosting, 2.5),
            record(ModelKind::LinearRegression, 1.5),
        ]);

        comparison.write_csv(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Model,RMSE,MAE,R2\nLinear_Regression,1.5,0.75,0.5\n"));
        assert_eq!(ModelComparison::read_csv(&path).unwrap(), comparison);
    }

    #[test]
    fn test_report_keeps_ten_samples() {
        let actual: Vec<f64> = (0..15).map(|i| i as f64).collect();
        let predicted: Vec<f64> = actual.iter().map(|a| a + 1.0).collect();

        let report = EvaluationReport::new(ModelKind::GradientBoosting, &actual, &predicted).unwrap();

        assert_eq!(report.samples.len(), SAMPLE_SIZE);
        assert_eq!(report.samples[3], (3.0, 4.0));
        assert_eq!(report.metrics.mae, 1.0);
    }
}
