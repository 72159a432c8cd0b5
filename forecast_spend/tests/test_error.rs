use forecast_spend::error::ForecastError;
use forecast_spend::PredictorConfig;
use spend_math::MathError;
use std::io;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_error_conversion() {
    // Test IO error conversion
    let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
    let forecast_error = ForecastError::from(io_error);
    assert!(matches!(forecast_error, ForecastError::IoError(_)));

    // Test JSON error conversion
    let json_error = serde_json::from_str::<Vec<f64>>("[1,").unwrap_err();
    let forecast_error = ForecastError::from(json_error);
    assert!(matches!(forecast_error, ForecastError::JsonError(_)));

    // Test math error conversion
    let math_error = MathError::InsufficientData("no rows".to_string());
    let forecast_error = ForecastError::from(math_error);
    assert!(matches!(forecast_error, ForecastError::MathError(_)));
}

#[test]
fn test_error_display() {
    let error = ForecastError::MalformedDate("17/07/2025".to_string());
    assert_eq!(format!("{}", error), "Malformed date: \"17/07/2025\"");

    let error = ForecastError::ForecastUnavailable("all 3 observations fall on 2025-07-17".to_string());
    assert!(error.to_string().starts_with("Forecast unavailable"));

    let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "permission denied");
    let error_string = format!("{}", ForecastError::from(io_error));
    assert!(error_string.contains("IO error"));
    assert!(error_string.contains("permission denied"));
}

#[test]
fn test_config_file_errors() {
    let missing = PredictorConfig::from_json_file("/nonexistent/spendcast.json");
    assert!(matches!(missing, Err(ForecastError::IoError(_))));

    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{{\"min_history_points\": \"three\"}}").unwrap();
    let invalid = PredictorConfig::from_json_file(file.path());
    assert!(matches!(invalid, Err(ForecastError::JsonError(_))));
}

#[test]
fn test_partial_config_keeps_defaults() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"min_history_points": 10, "forecaster": {{"holiday_region": null, "interval_width": 0.8}}}}"#
    )
    .unwrap();

    let config = PredictorConfig::from_json_file(file.path()).unwrap();

    assert_eq!(config.min_history_points, 10);
    assert_eq!(config.forecaster.holiday_region, None);
    assert_eq!(config.forecaster.interval_width, 0.8);
    assert_eq!(config.forecaster.weekly_order, 3);
    assert_eq!(
        config.history_path,
        PredictorConfig::default().history_path
    );
}
