//! Evaluation stage: re-score the persisted production model

use crate::config::PipelineConfig;
use crate::data::ProcessedTable;
use crate::error::Result;
use crate::metrics::EvaluationReport;
use crate::models::{TrainedModel, TrainedRegressor};
use crate::scaler::StandardScaler;
use crate::utils::chronological_split;
use tracing::info;

/// Score `model` on the trailing `test_ratio` rows of `table`
pub fn evaluate_on_table(
    model: &TrainedModel,
    table: &ProcessedTable,
    test_ratio: f64,
) -> Result<EvaluationReport> {
    let split = chronological_split(table.len(), test_ratio)?;
    let (x_test, y_test) = table.slice(split.test);
    let predictions = model.predict(x_test)?;
    EvaluationReport::new(model.kind(), y_test, &predictions)
}

/// Reload the production model and processed table and recompute the
/// held-out metrics. Read-only.
pub fn evaluate_model(config: &PipelineConfig) -> Result<EvaluationReport> {
    let scaler = StandardScaler::load(config.scaler_path())?;
    let model = TrainedModel::load(config.production_model_path())?;
    let table = ProcessedTable::load_csv(config.processed_path())?;
    scaler.check_columns(table.feature_names())?;

    let report = evaluate_on_table(&model, &table, config.test_ratio)?;
    info!(model = %report.model, metrics = %report.metrics, "production model evaluated");
    for (actual, predicted) in &report.samples {
        info!(actual = *actual, predicted = *predicted, "sample");
    }

    Ok(report)
}
