//! Preprocessing stage

use crate::config::PipelineConfig;
use crate::data::{DataLoader, ProcessedTable};
use crate::error::Result;
use crate::features::FeatureBuilder;
use crate::scaler::StandardScaler;
use tracing::info;

/// Turn the raw sales table into the scaled processed table and persist
/// it together with the fitted scaler.
pub fn run_preprocessing(config: &PipelineConfig) -> Result<ProcessedTable> {
    let raw_path = config.raw_path();
    let raw = DataLoader::from_csv(&raw_path)?;
    info!(path = %raw_path.display(), rows = raw.len(), stores = raw.stores().len(), "raw sales loaded");

    let features = FeatureBuilder::new().build(&raw)?;
    let scaler = StandardScaler::fit(&features.feature_names, &features.rows)?;
    let processed = ProcessedTable::new(
        features.feature_names.clone(),
        scaler.transform(&features.rows)?,
        features.target,
    )?;

    let processed_path = config.processed_path();
    processed.save_csv(&processed_path)?;
    scaler.save(config.scaler_path())?;
    info!(
        path = %processed_path.display(),
        rows = processed.len(),
        features = processed.feature_names().len(),
        "processed table written"
    );

    Ok(processed)
}
