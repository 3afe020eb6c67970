//! Pipeline configuration
//!
//! Every stage receives a [`PipelineConfig`] instead of reading fixed
//! locations, so stages can run outside a scheduler and in tests.

use crate::error::{ForecastError, Result};
use crate::models::{ModelKind, PRODUCTION_MODEL};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Locations and tunables shared by all pipeline stages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Directory holding the raw sales table
    pub input_dir: PathBuf,
    /// Directory for model, scaler and metrics artifacts
    pub model_dir: PathBuf,
    /// Directory for the processed table and forecast output
    pub output_dir: PathBuf,
    #[serde(default = "default_raw_file")]
    pub raw_file: String,
    #[serde(default = "default_processed_file")]
    pub processed_file: String,
    #[serde(default = "default_forecast_file")]
    pub forecast_file: String,
    /// Fraction of rows, taken from the end, held out for testing
    #[serde(default = "default_test_ratio")]
    pub test_ratio: f64,
    #[serde(default = "default_forecast_weeks")]
    pub forecast_weeks: usize,
    #[serde(default)]
    pub retry: RetryPolicy,
}

/// Per-stage retry budget used by the pipeline runner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Attempts after the first failure
    pub retries: u32,
    /// Fixed pause between attempts
    pub delay_secs: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 2,
            delay_secs: 120,
        }
    }
}

fn default_raw_file() -> String {
    "walmart_sales.csv".to_string()
}

fn default_processed_file() -> String {
    "processed_walmart_sales.csv".to_string()
}

fn default_forecast_file() -> String {
    "future_sales_forecast.csv".to_string()
}

fn default_test_ratio() -> f64 {
    0.2
}

fn default_forecast_weeks() -> usize {
    4
}

/// File name of the persisted feature scaler
pub const SCALER_FILE: &str = "scaler.json";
/// File name of the model comparison table
pub const METRICS_FILE: &str = "model_performance_metrics.csv";

impl PipelineConfig {
    /// Create a configuration with default file names and tunables
    pub fn new(
        input_dir: impl Into<PathBuf>,
        model_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            input_dir: input_dir.into(),
            model_dir: model_dir.into(),
            output_dir: output_dir.into(),
            raw_file: default_raw_file(),
            processed_file: default_processed_file(),
            forecast_file: default_forecast_file(),
            test_ratio: default_test_ratio(),
            forecast_weeks: default_forecast_weeks(),
            retry: RetryPolicy::default(),
        }
    }

    /// Load a configuration from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ForecastError::MissingArtifact {
                path: path.to_path_buf(),
            },
            _ => ForecastError::IoError(e),
        })?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject tunables no stage can work with
    pub fn validate(&self) -> Result<()> {
        if !(self.test_ratio > 0.0 && self.test_ratio < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "test_ratio must be between 0 and 1, got {}",
                self.test_ratio
            )));
        }
        if self.forecast_weeks == 0 {
            return Err(ForecastError::InvalidParameter(
                "forecast_weeks must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn raw_path(&self) -> PathBuf {
        self.input_dir.join(&self.raw_file)
    }

    pub fn processed_path(&self) -> PathBuf {
        self.output_dir.join(&self.processed_file)
    }

    pub fn forecast_path(&self) -> PathBuf {
        self.output_dir.join(&self.forecast_file)
    }

    pub fn scaler_path(&self) -> PathBuf {
        self.model_dir.join(SCALER_FILE)
    }

    pub fn metrics_path(&self) -> PathBuf {
        self.model_dir.join(METRICS_FILE)
    }

    /// Artifact path of one model family
    pub fn model_path(&self, kind: ModelKind) -> PathBuf {
        self.model_dir.join(format!("{}.json", kind.name()))
    }

    /// Artifact path of the model the evaluator and forecaster consume
    pub fn production_model_path(&self) -> PathBuf {
        self.model_dir.join(PRODUCTION_MODEL.production_file_name())
    }
}
