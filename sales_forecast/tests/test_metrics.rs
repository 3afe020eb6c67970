use approx::assert_relative_eq;
use rstest::rstest;
use sales_forecast::metrics::{EvaluationReport, MetricsRecord, ModelComparison};
use sales_forecast::{ModelKind, ProcessedTable};
use sales_forecast::training::fit_and_score;
use sales_math::RegressionMetrics;
use tempfile::tempdir;

fn seasonal_table(rows: usize) -> ProcessedTable {
    let names = vec!["trend".to_string(), "season".to_string()];
    let x: Vec<Vec<f64>> = (0..rows)
        .map(|i| vec![i as f64, (i % 4) as f64])
        .collect();
    let y = x.iter().map(|r| 1000.0 + 5.0 * r[0] + 40.0 * r[1]).collect();
    ProcessedTable::new(names, x, y).unwrap()
}

#[test]
fn test_metrics_file_sorted_by_rmse() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("model_performance_metrics.csv");
    let (_, comparison) = fit_and_score(&seasonal_table(40), 0.2).unwrap();

    comparison.write_csv(&path).unwrap();

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(headers, vec!["Model", "RMSE", "MAE", "R2"]);

    let rows: Vec<MetricsRecord> = reader.deserialize().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 3);
    assert!(rows.windows(2).all(|w| w[0].rmse <= w[1].rmse));
}

#[rstest]
#[case(ModelKind::LinearRegression)]
#[case(ModelKind::RandomForest)]
#[case(ModelKind::GradientBoosting)]
fn test_every_model_is_scored(#[case] kind: ModelKind) {
    let (_, comparison) = fit_and_score(&seasonal_table(40), 0.2).unwrap();
    let record = comparison.get(kind).unwrap();

    assert!(record.rmse.is_finite() && record.rmse >= 0.0);
    assert!(record.mae <= record.rmse + 1e-9);
}

#[test]
fn test_read_back_comparison() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("metrics.csv");
    let comparison = ModelComparison::new(vec![
        MetricsRecord::new(
            ModelKind::RandomForest,
            RegressionMetrics {
                rmse: 12.5,
                mae: 10.0,
                r2: 0.8,
            },
        ),
        MetricsRecord::new(
            ModelKind::GradientBoosting,
            RegressionMetrics {
                rmse: 9.0,
                mae: 7.5,
                r2: 0.9,
            },
        ),
    ]);

    comparison.write_csv(&path).unwrap();
    let loaded = ModelComparison::read_csv(&path).unwrap();

    assert_eq!(loaded.best().unwrap().model, "Gradient_Boosting");
    assert_eq!(loaded, comparison);
}

#[test]
fn test_evaluation_report_metrics() {
    let actual = [100.0, 110.0, 120.0, 130.0];
    let predicted = [102.0, 108.0, 120.0, 134.0];

    let report = EvaluationReport::new(ModelKind::GradientBoosting, &actual, &predicted).unwrap();

    assert_relative_eq!(report.metrics.mae, 2.0);
    assert_relative_eq!(report.metrics.rmse, 6.0_f64.sqrt());
    assert_eq!(report.samples.len(), 4);
}
