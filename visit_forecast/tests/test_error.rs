use std::io;
use visit_forecast::ForecastError;
use visit_math::MathError;

#[test]
fn test_error_conversion() {
    // Test IO error conversion
    let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
    let forecast_error = ForecastError::from(io_error);
    assert!(matches!(forecast_error, ForecastError::IoError(_)));

    // Math errors map onto the closest forecast variant
    let math_error = MathError::InvalidInput("month 13".to_string());
    assert!(matches!(
        ForecastError::from(math_error),
        ForecastError::InvalidParameter(_)
    ));

    let json_error = serde_json::from_str::<f64>("oops").unwrap_err();
    assert!(matches!(
        ForecastError::from(json_error),
        ForecastError::JsonError(_)
    ));
}

#[test]
fn test_error_display() {
    let error = ForecastError::InsufficientHistory {
        site: "Badlands".to_string(),
        required: 12,
        found: 11,
    };
    let error_string = format!("{}", error);

    assert!(error_string.contains("Badlands"));
    assert!(error_string.contains("12"));
    assert!(error_string.contains("11"));

    let error = ForecastError::MalformedRow {
        line: 42,
        reason: "invalid month".to_string(),
    };
    assert_eq!(error.to_string(), "Malformed row at line 42: invalid month");
}

#[test]
fn test_only_configuration_errors_are_fatal() {
    assert!(ForecastError::FatalConfiguration("model missing".to_string()).is_fatal());

    assert!(!ForecastError::EmptyHistory("A".to_string()).is_fatal());
    assert!(!ForecastError::ModelInference("boom".to_string()).is_fatal());
    assert!(!ForecastError::InvalidHistory("gap".to_string()).is_fatal());
    assert!(!ForecastError::InsufficientHistory {
        site: "A".to_string(),
        required: 12,
        found: 0,
    }
    .is_fatal());
}
