use sales_forecast::error::ForecastError;
use sales_math::MathError;
use std::io;
use std::path::PathBuf;

#[test]
fn test_error_conversion() {
    let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
    assert!(matches!(ForecastError::from(io_error), ForecastError::IoError(_)));

    let math_error = MathError::InsufficientData("need one value".to_string());
    assert!(matches!(ForecastError::from(math_error), ForecastError::MathError(_)));

    let json_error = serde_json::from_str::<f64>("not json").unwrap_err();
    assert!(matches!(
        ForecastError::from(json_error),
        ForecastError::SerializationError(_)
    ));
}

#[test]
fn test_error_display() {
    let error = ForecastError::MissingArtifact {
        path: PathBuf::from("models/gradient_boosting_model.json"),
    };
    assert_eq!(
        error.to_string(),
        "Missing artifact: models/gradient_boosting_model.json"
    );

    let error = ForecastError::DateFormat {
        value: "2010-02-05".to_string(),
        expected: "%d-%m-%Y".to_string(),
    };
    assert_eq!(
        error.to_string(),
        "Date '2010-02-05' does not match format '%d-%m-%Y'"
    );

    let error = ForecastError::model_fit("Random_Forest", "no training rows");
    assert_eq!(error.to_string(), "Failed to fit Random_Forest: no training rows");
}

#[test]
fn test_error_variants_are_distinct() {
    let schema = ForecastError::MissingColumn("Store".to_string());
    let history = ForecastError::InsufficientHistory("no rows".to_string());

    assert!(matches!(schema, ForecastError::MissingColumn(ref c) if c == "Store"));
    assert!(!matches!(history, ForecastError::MissingColumn(_)));
}
