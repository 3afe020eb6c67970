//! Training stage

use crate::config::PipelineConfig;
use crate::data::ProcessedTable;
use crate::error::Result;
use crate::metrics::{MetricsRecord, ModelComparison};
use crate::models::{ModelKind, TrainedModel, TrainedRegressor, PRODUCTION_MODEL};
use crate::utils::chronological_split;
use sales_math::RegressionMetrics;
use tracing::{debug, info};

/// Fit every model family on the leading rows of `table` and score each on
/// the trailing rows. Nothing is written.
pub fn fit_and_score(
    table: &ProcessedTable,
    test_ratio: f64,
) -> Result<(Vec<TrainedModel>, ModelComparison)> {
    let split = chronological_split(table.len(), test_ratio)?;
    let (x_train, y_train) = table.slice(split.train.clone());
    let (x_test, y_test) = table.slice(split.test.clone());
    debug!(train = x_train.len(), test = x_test.len(), "chronological split");

    let mut models = Vec::with_capacity(ModelKind::ALL.len());
    let mut records = Vec::with_capacity(ModelKind::ALL.len());
    for kind in ModelKind::ALL {
        let model = kind.train(x_train, y_train)?;
        let predictions = model.predict(x_test)?;
        let metrics = RegressionMetrics::evaluate(y_test, &predictions)?;
        info!(model = %kind, %metrics, "model scored");

        records.push(MetricsRecord::new(kind, metrics));
        models.push(model);
    }

    Ok((models, ModelComparison::new(records)))
}

/// Train all models, then persist each one, the production copy and the
/// comparison table.
pub fn train_models(config: &PipelineConfig) -> Result<ModelComparison> {
    let table = ProcessedTable::load_csv(config.processed_path())?;
    info!(rows = table.len(), features = table.feature_names().len(), "training models");

    let (models, comparison) = fit_and_score(&table, config.test_ratio)?;

    for model in &models {
        let path = config.model_path(model.kind());
        model.save(&path)?;
        debug!(model = %model.kind(), path = %path.display(), "model saved");

        if model.kind() == PRODUCTION_MODEL {
            model.save(config.production_model_path())?;
        }
    }
    comparison.write_csv(config.metrics_path())?;

    if let Some(best) = comparison.best() {
        info!(best = %best.model, production = %PRODUCTION_MODEL, "training complete");
    }

    Ok(comparison)
}
