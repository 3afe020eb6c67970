//! Error types for the sales_forecast crate

use polars::prelude::PolarsError;
use sales_math::MathError;
use std::path::PathBuf;
use thiserror::Error;

/// Custom error types for the sales_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// A file produced by an earlier stage is not there
    #[error("Missing artifact: {}", path.display())]
    MissingArtifact { path: PathBuf },

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),

    /// Error reading or writing a CSV record table
    #[error("CSV error: {0}")]
    CsvError(String),

    /// Error encoding or decoding a JSON artifact
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A required column is absent from the input
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// A date does not follow the expected pattern
    #[error("Date '{value}' does not match format '{expected}'")]
    DateFormat { value: String, expected: String },

    /// Input columns have the wrong type or content
    #[error("Schema error: {0}")]
    SchemaError(String),

    /// No rows survive once incomplete history is dropped
    #[error("Insufficient history: {0}")]
    InsufficientHistory(String),

    /// A model could not be fitted
    #[error("Failed to fit {model}: {reason}")]
    ModelFit { model: String, reason: String },

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error related to data validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error from mathematical operations
    #[error("Math error: {0}")]
    MathError(#[from] MathError),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        ForecastError::CsvError(err.to_string())
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::SerializationError(err.to_string())
    }
}

impl ForecastError {
    /// Shorthand for a fit failure of the named model
    pub fn model_fit(model: impl Into<String>, reason: impl Into<String>) -> Self {
        ForecastError::ModelFit {
            model: model.into(),
            reason: reason.into(),
        }
    }
}
