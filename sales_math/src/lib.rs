//! # Sales Math
//!
//! Numeric building blocks for weekly sales forecasting.
//! This crate provides trailing-window features (lags and rolling means),
//! descriptive statistics used for feature scaling, and the regression
//! metrics used to compare models.

use thiserror::Error;

pub mod metrics;
pub mod moving_averages;
pub mod statistics;

pub use metrics::{mean_absolute_error, r2_score, root_mean_squared_error, RegressionMetrics};
pub use moving_averages::{lagged, trailing_means, SimpleMovingAverage};
pub use statistics::{mean, std_dev};

/// Errors that can occur in sales math calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for sales math operations
pub type Result<T> = std::result::Result<T, MathError>;
