//! Standard scaling of feature columns
//!
//! The scaler is fitted once during preprocessing and persisted next to
//! the models. Anything that feeds rows to a trained model loads it back
//! rather than refitting.

use crate::error::{ForecastError, Result};
use crate::utils::{require_artifact, write_atomic};
use sales_math::{mean, std_dev};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Per-feature mean and scale, keyed by feature name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    feature_names: Vec<String>,
    means: Vec<f64>,
    scales: Vec<f64>,
}

impl StandardScaler {
    /// Fit column means and population standard deviations.
    ///
    /// A column with zero variance gets scale 1, so it maps to all zeros.
    pub fn fit(feature_names: &[String], rows: &[Vec<f64>]) -> Result<Self> {
        if rows.is_empty() {
            return Err(ForecastError::InsufficientHistory(
                "cannot fit a scaler on an empty table".to_string(),
            ));
        }

        let mut means = Vec::with_capacity(feature_names.len());
        let mut scales = Vec::with_capacity(feature_names.len());
        for j in 0..feature_names.len() {
            let column: Vec<f64> = rows.iter().map(|row| row[j]).collect();
            let spread = std_dev(&column)?;
            means.push(mean(&column)?);
            scales.push(if spread > 0.0 { spread } else { 1.0 });
        }

        Ok(Self {
            feature_names: feature_names.to_vec(),
            means,
            scales,
        })
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    pub fn scales(&self) -> &[f64] {
        &self.scales
    }

    /// Map one raw row into scaled space
    pub fn transform_row(&self, row: &[f64]) -> Result<Vec<f64>> {
        self.check_width(row)?;
        Ok(row
            .iter()
            .zip(self.means.iter().zip(&self.scales))
            .map(|(x, (m, s))| (x - m) / s)
            .collect())
    }

    /// Map many raw rows into scaled space
    pub fn transform(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        rows.iter().map(|row| self.transform_row(row)).collect()
    }

    /// Map one scaled row back to raw feature space
    pub fn inverse_transform_row(&self, row: &[f64]) -> Result<Vec<f64>> {
        self.check_width(row)?;
        Ok(row
            .iter()
            .zip(self.means.iter().zip(&self.scales))
            .map(|(z, (m, s))| z * s + m)
            .collect())
    }

    /// Confirm a table's feature columns are exactly the ones this scaler was fitted on
    pub fn check_columns(&self, feature_names: &[String]) -> Result<()> {
        if feature_names != self.feature_names.as_slice() {
            return Err(ForecastError::SchemaError(format!(
                "feature columns {:?} do not match scaler columns {:?}",
                feature_names, self.feature_names
            )));
        }
        Ok(())
    }

    fn check_width(&self, row: &[f64]) -> Result<()> {
        if row.len() != self.feature_names.len() {
            return Err(ForecastError::ValidationError(format!(
                "Row has {} values, scaler expects {}",
                row.len(),
                self.feature_names.len()
            )));
        }
        Ok(())
    }

    /// Persist as JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_atomic(path.as_ref(), |writer| {
            serde_json::to_writer_pretty(writer, self)?;
            Ok(())
        })
    }

    /// Load a scaler written by [`StandardScaler::save`]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        require_artifact(path)?;
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}
