//! Feature building for per-store weekly sales
//!
//! Turns the raw table into a model-ready feature table: calendar fields,
//! lagged sales, trailing means of past sales and one-hot store
//! indicators. All temporal features are computed inside a single store's
//! history, never across stores.

use crate::data::{RawSalesTable, TARGET_COLUMN};
use crate::error::{ForecastError, Result};
use chrono::{Datelike, NaiveDate};
use sales_math::{lagged, trailing_means};
use tracing::debug;

/// Sales one week earlier
pub const LAG_1_COLUMN: &str = "Weekly_Sales_lag_1";
/// Sales two weeks earlier
pub const LAG_2_COLUMN: &str = "Weekly_Sales_lag_2";
/// Mean of the previous 4 weeks' sales
pub const ROLLING_4_COLUMN: &str = "Rolling_mean_4";
/// Mean of the previous 12 weeks' sales
pub const ROLLING_12_COLUMN: &str = "Rolling_mean_12";

const CALENDAR_COLUMNS: [&str; 3] = ["year", "month", "week"];

/// Identifies the raw observation a feature row came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowKey {
    pub store: i64,
    pub date: NaiveDate,
}

/// Unscaled feature table with its target column
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    pub feature_names: Vec<String>,
    pub rows: Vec<Vec<f64>>,
    pub target: Vec<f64>,
    /// Source store and date of each row
    pub keys: Vec<RowKey>,
}

impl FeatureTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a feature column, if present
    pub fn feature_index(&self, name: &str) -> Option<usize> {
        self.feature_names.iter().position(|n| n == name)
    }

    /// Values of one feature column
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let j = self.feature_index(name)?;
        Some(self.rows.iter().map(|row| row[j]).collect())
    }
}

/// Column name of the indicator for `store`
pub fn store_indicator_column(store: i64) -> String {
    format!("Store_{}", store)
}

/// Builds the feature table from raw sales records
#[derive(Debug, Clone, Default)]
pub struct FeatureBuilder;

impl FeatureBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Build the unscaled feature table.
    ///
    /// Rows lacking any lag, trailing mean, regressor or target value are
    /// dropped, which removes the first 12 weeks of each store.
    pub fn build(&self, raw: &RawSalesTable) -> Result<FeatureTable> {
        let mut raw = raw.clone();
        raw.sort_by_store_and_date();

        let mut kept = Vec::new();
        for (store, range) in raw.store_partitions() {
            let records = &raw.records()[range];
            let sales: Vec<Option<f64>> = records.iter().map(|r| r.weekly_sales).collect();

            let lag_1 = lagged(&sales, 1);
            let lag_2 = lagged(&sales, 2);
            // Trailing means run over the lag-1 series so the current week is excluded
            let rolling_4 = trailing_means(&lag_1, 4)?;
            let rolling_12 = trailing_means(&lag_1, 12)?;

            for (i, record) in records.iter().enumerate() {
                let temporal = [lag_1[i], lag_2[i], rolling_4[i], rolling_12[i]];
                let regressors: Option<Vec<f64>> = record.regressors.iter().copied().collect();
                let temporal: Option<Vec<f64>> = temporal.into_iter().collect();

                if let (Some(regressors), Some(temporal), Some(target)) =
                    (regressors, temporal, record.weekly_sales)
                {
                    let date = record.date;
                    let mut row = regressors;
                    row.extend([
                        date.year() as f64,
                        date.month() as f64,
                        date.iso_week().week() as f64,
                    ]);
                    row.extend(temporal);
                    kept.push((RowKey { store, date }, row, target));
                }
            }
        }

        if kept.is_empty() {
            return Err(ForecastError::InsufficientHistory(format!(
                "no store has the 13 consecutive complete weeks needed for {}",
                ROLLING_12_COLUMN
            )));
        }

        // One indicator per surviving store, dropping the first as reference level
        let mut stores: Vec<i64> = kept.iter().map(|(key, _, _)| key.store).collect();
        stores.dedup();
        let indicator_stores = &stores[1..];

        let mut feature_names: Vec<String> = raw.regressor_names().to_vec();
        feature_names.extend(CALENDAR_COLUMNS.iter().map(|c| c.to_string()));
        feature_names.extend(
            [LAG_1_COLUMN, LAG_2_COLUMN, ROLLING_4_COLUMN, ROLLING_12_COLUMN]
                .iter()
                .map(|c| c.to_string()),
        );
        feature_names.extend(indicator_stores.iter().map(|&s| store_indicator_column(s)));

        if let Some(clash) = feature_names.iter().find(|n| n.as_str() == TARGET_COLUMN) {
            return Err(ForecastError::SchemaError(format!(
                "feature column '{}' collides with the target",
                clash
            )));
        }

        let mut keys = Vec::with_capacity(kept.len());
        let mut rows = Vec::with_capacity(kept.len());
        let mut target = Vec::with_capacity(kept.len());
        for (key, mut row, sales) in kept {
            row.extend(
                indicator_stores
                    .iter()
                    .map(|&s| if s == key.store { 1.0 } else { 0.0 }),
            );
            keys.push(key);
            rows.push(row);
            target.push(sales);
        }

        debug!(
            rows = rows.len(),
            features = feature_names.len(),
            stores = stores.len(),
            "feature table built"
        );

        Ok(FeatureTable {
            feature_names,
            rows,
            target,
            keys,
        })
    }
}
