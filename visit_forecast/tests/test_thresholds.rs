use approx::assert_relative_eq;
use visit_forecast::{CrowdLevel, CrowdThresholds, ForecastError};

fn one_to_ten() -> Vec<f64> {
    (1..=10).map(|v| v as f64).collect()
}

#[test]
fn test_default_quantiles() {
    let thresholds = CrowdThresholds::from_history("Arches", &one_to_ten(), 0.40, 0.70).unwrap();

    // positions 0.4 * 9 = 3.6 and 0.7 * 9 = 6.3
    assert_relative_eq!(thresholds.low, 4.6, epsilon = 1e-9);
    assert_relative_eq!(thresholds.high, 7.3, epsilon = 1e-9);
}

#[test]
fn test_missing_values_are_dropped() {
    let mut values = one_to_ten();
    values.push(f64::NAN);
    values.insert(0, f64::INFINITY);

    let with_gaps = CrowdThresholds::from_history("Arches", &values, 0.40, 0.70).unwrap();
    let clean = CrowdThresholds::from_history("Arches", &one_to_ten(), 0.40, 0.70).unwrap();

    assert_eq!(with_gaps, clean);
}

#[test]
fn test_classification_boundaries() {
    let thresholds = CrowdThresholds {
        low: 100.0,
        high: 200.0,
    };

    assert_eq!(thresholds.classify(99.999), CrowdLevel::Low);
    assert_eq!(thresholds.classify(100.0), CrowdLevel::Medium);
    assert_eq!(thresholds.classify(150.0), CrowdLevel::Medium);
    assert_eq!(thresholds.classify(199.999), CrowdLevel::Medium);
    assert_eq!(thresholds.classify(200.0), CrowdLevel::High);
    assert_eq!(thresholds.classify(1e9), CrowdLevel::High);
}

#[test]
fn test_equal_thresholds_have_no_medium_band() {
    let thresholds = CrowdThresholds::from_history("Flat", &[100.0; 12], 0.40, 0.70).unwrap();

    assert_eq!(thresholds.classify(99.0), CrowdLevel::Low);
    assert_eq!(thresholds.classify(100.0), CrowdLevel::High);
}

#[test]
fn test_empty_history() {
    let result = CrowdThresholds::from_history("Nowhere", &[], 0.40, 0.70);
    assert!(matches!(result, Err(ForecastError::EmptyHistory(site)) if site == "Nowhere"));

    let result = CrowdThresholds::from_history("Nowhere", &[f64::NAN, f64::NAN], 0.40, 0.70);
    assert!(matches!(result, Err(ForecastError::EmptyHistory(_))));
}

#[test]
fn test_quantile_validation() {
    assert!(CrowdThresholds::validate_quantiles(0.40, 0.70).is_ok());
    assert!(CrowdThresholds::validate_quantiles(0.5, 0.5).is_ok());
    assert!(CrowdThresholds::validate_quantiles(0.0, 0.70).is_err());
    assert!(CrowdThresholds::validate_quantiles(0.40, 1.0).is_err());
    assert!(CrowdThresholds::validate_quantiles(0.80, 0.20).is_err());
    assert!(CrowdThresholds::validate_quantiles(f64::NAN, 0.5).is_err());
}

#[test]
fn test_crowd_level_labels() {
    assert_eq!(CrowdLevel::Low.to_string(), "low");
    assert_eq!(CrowdLevel::Medium.as_str(), "medium");
    assert_eq!(serde_json::to_string(&CrowdLevel::High).unwrap(), "\"high\"");
    assert!(CrowdLevel::Low < CrowdLevel::High);
}
