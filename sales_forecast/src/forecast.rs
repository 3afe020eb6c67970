//! Recursive multi-week forecasting
//!
//! Starting from the most recent processed row, each step predicts one
//! week ahead and feeds that prediction back into the lag and rolling
//! columns of the row used for the following week.

use crate::config::PipelineConfig;
use crate::data::ProcessedTable;
use crate::error::{ForecastError, Result};
use crate::features::{LAG_1_COLUMN, LAG_2_COLUMN, ROLLING_12_COLUMN, ROLLING_4_COLUMN};
use crate::models::{TrainedModel, TrainedRegressor};
use crate::scaler::StandardScaler;
use crate::utils::write_atomic;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// One row of the forecast output table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    #[serde(rename = "Week_Ahead")]
    pub week_ahead: usize,
    #[serde(rename = "Predicted_Weekly_Sales")]
    pub predicted_weekly_sales: f64,
}

/// A single forecast step with the raw feature row it was predicted from
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastStep {
    pub week_ahead: usize,
    pub prediction: f64,
    /// Unscaled features fed to the model at this step
    pub features: Vec<f64>,
}

impl From<&ForecastStep> for ForecastRecord {
    fn from(step: &ForecastStep) -> Self {
        Self {
            week_ahead: step.week_ahead,
            predicted_weekly_sales: round2(step.prediction),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Positions of the columns rewritten between steps
#[derive(Debug, Clone, Copy)]
struct FeedbackColumns {
    lag_1: Option<usize>,
    lag_2: Option<usize>,
    rolling_4: Option<usize>,
    rolling_12: Option<usize>,
}

impl FeedbackColumns {
    fn locate(table: &ProcessedTable) -> Self {
        Self {
            lag_1: table.feature_index(LAG_1_COLUMN),
            lag_2: table.feature_index(LAG_2_COLUMN),
            rolling_4: table.feature_index(ROLLING_4_COLUMN),
            rolling_12: table.feature_index(ROLLING_12_COLUMN),
        }
    }

    /// Shift the lags and overwrite both rolling means with `prediction`
    fn apply(&self, row: &mut [f64], prediction: f64) {
        if let (Some(lag_2), Some(lag_1)) = (self.lag_2, self.lag_1) {
            row[lag_2] = row[lag_1];
        }
        for index in [self.lag_1, self.rolling_4, self.rolling_12].into_iter().flatten() {
            row[index] = prediction;
        }
    }
}

/// Predicts several weeks ahead with a trained model and its feature scaler
#[derive(Debug)]
pub struct RecursiveForecaster<'a, M: TrainedRegressor> {
    model: &'a M,
    scaler: &'a StandardScaler,
}

impl<'a, M: TrainedRegressor> RecursiveForecaster<'a, M> {
    /// Pair a model with the scaler its training rows went through
    pub fn new(model: &'a M, scaler: &'a StandardScaler) -> Result<Self> {
        if model.n_features() != scaler.feature_names().len() {
            return Err(ForecastError::SchemaError(format!(
                "model expects {} features but the scaler has {}",
                model.n_features(),
                scaler.feature_names().len()
            )));
        }
        Ok(Self { model, scaler })
    }

    /// Forecast `weeks` steps from the last row of `table`
    pub fn forecast(&self, table: &ProcessedTable, weeks: usize) -> Result<Vec<ForecastStep>> {
        if weeks == 0 {
            return Err(ForecastError::InvalidParameter(
                "forecast horizon must be at least one week".to_string(),
            ));
        }
        self.scaler.check_columns(table.feature_names())?;

        let (last_row, mut target) = table.last().ok_or_else(|| {
            ForecastError::InsufficientHistory("processed table has no rows".to_string())
        })?;
        let feedback = FeedbackColumns::locate(table);
        let mut current = self.scaler.inverse_transform_row(last_row)?;
        debug!(?feedback, last_target = target, "starting recursive forecast");

        let mut steps = Vec::with_capacity(weeks);
        for week_ahead in 1..=weeks {
            let scaled = self.scaler.transform_row(&current)?;
            let prediction = self.model.predict_row(&scaled)?;
            if !prediction.is_finite() {
                return Err(ForecastError::ValidationError(format!(
                    "non-finite prediction at week {}",
                    week_ahead
                )));
            }
            info!(week_ahead, prediction = round2(prediction), "forecast step");

            steps.push(ForecastStep {
                week_ahead,
                prediction,
                features: current.clone(),
            });

            feedback.apply(&mut current, prediction);
            target = prediction;
        }
        debug!(final_target = target, "recursive forecast finished");

        Ok(steps)
    }
}

/// Write forecast records as CSV with the header `Week_Ahead,Predicted_Weekly_Sales`
pub fn write_forecast_csv<P: AsRef<Path>>(path: P, records: &[ForecastRecord]) -> Result<()> {
    write_atomic(path.as_ref(), |writer| {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for record in records {
            csv_writer.serialize(record)?;
        }
        csv_writer.flush()?;
        Ok(())
    })
}

/// Forecast stage: predict `weeks` future weeks with the production model
/// and write the forecast table.
pub fn forecast_future_sales(config: &PipelineConfig, weeks: usize) -> Result<Vec<ForecastRecord>> {
    let scaler = StandardScaler::load(config.scaler_path())?;
    let model = TrainedModel::load(config.production_model_path())?;
    let table = ProcessedTable::load_csv(config.processed_path())?;
    info!(model = %model.kind(), weeks, "forecasting future weekly sales");

    let steps = RecursiveForecaster::new(&model, &scaler)?.forecast(&table, weeks)?;
    let records: Vec<ForecastRecord> = steps.iter().map(ForecastRecord::from).collect();

    let path = config.forecast_path();
    write_forecast_csv(&path, &records)?;
    info!(path = %path.display(), "forecast written");

    Ok(records)
}
