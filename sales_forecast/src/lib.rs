//! # Sales Forecast
//!
//! A batch pipeline that forecasts weekly retail sales for many stores.
//!
//! ## Stages
//!
//! - **Preprocess**: parse the raw table, build calendar, lag, rolling and
//!   store-indicator features, fit and persist the standard scaler, and
//!   write the processed table
//! - **Train**: fit linear regression, random forest and gradient boosting
//!   on a chronological split, persist every model plus the production
//!   copy and the metrics comparison
//! - **Evaluate**: re-score the production model on the held-out weeks
//! - **Forecast**: predict several weeks ahead, feeding each prediction
//!   back into the next week's lag and rolling features
//!
//! A descriptive [`TableSummary`] of the raw table is available for
//! inspecting input before running the stages.
//!
//! Stages communicate only through files under the directories named in
//! [`PipelineConfig`], so each can be run on its own.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sales_forecast::config::PipelineConfig;
//! use sales_forecast::{evaluate_model, forecast_future_sales, run_preprocessing, train_models};
//!
//! fn main() -> sales_forecast::error::Result<()> {
//!     let config = PipelineConfig::new("data", "models", "output");
//!
//!     run_preprocessing(&config)?;
//!     let comparison = train_models(&config)?;
//!     println!("{}", comparison);
//!
//!     let report = evaluate_model(&config)?;
//!     println!("{}", report.metrics);
//!
//!     for record in forecast_future_sales(&config, 4)? {
//!         println!("Week {}: {:.2}", record.week_ahead, record.predicted_weekly_sales);
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod evaluation;
pub mod features;
pub mod forecast;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod preprocess;
pub mod scaler;
pub mod summary;
pub mod training;
pub mod utils;

// Re-export commonly used types
pub use crate::config::PipelineConfig;
pub use crate::data::{DataLoader, ProcessedTable, RawSalesTable};
pub use crate::error::ForecastError;
pub use crate::evaluation::evaluate_model;
pub use crate::features::{FeatureBuilder, FeatureTable};
pub use crate::forecast::{forecast_future_sales, ForecastRecord, RecursiveForecaster};
pub use crate::metrics::{EvaluationReport, ModelComparison};
pub use crate::models::{ModelKind, TrainedModel, TrainedRegressor, PRODUCTION_MODEL};
pub use crate::pipeline::{run_pipeline, Stage};
pub use crate::preprocess::run_preprocessing;
pub use crate::scaler::StandardScaler;
pub use crate::summary::TableSummary;
pub use crate::training::train_models;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
