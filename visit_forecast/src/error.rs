//! Error types for the visit_forecast crate

use polars::prelude::PolarsError;
use thiserror::Error;
use visit_math::MathError;

/// Custom error types for the visit_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Site has fewer observations than the longest lag needs
    #[error("Insufficient history for site '{site}': need at least {required} months, found {found}")]
    InsufficientHistory {
        site: String,
        required: usize,
        found: usize,
    },

    /// No usable values to calibrate crowd thresholds from
    #[error("Empty history for site '{0}': no usable values to compute thresholds")]
    EmptyHistory(String),

    /// Unparseable historical record
    #[error("Malformed row at line {line}: {reason}")]
    MalformedRow { line: usize, reason: String },

    /// Site history is not a strictly increasing, gap-free monthly series
    #[error("Invalid history: {0}")]
    InvalidHistory(String),

    /// The regression model failed to produce a prediction
    #[error("Model inference error: {0}")]
    ModelInference(String),

    /// Model or input unavailable; aborts the whole batch
    #[error("Fatal configuration error: {0}")]
    FatalConfiguration(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from CSV reading or writing
    #[error("CSV error: {0}")]
    CsvError(String),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),

    /// Error from JSON (de)serialization
    #[error("JSON error: {0}")]
    JsonError(String),

    /// Error from reading a configuration file
    #[error("Config error: {0}")]
    ConfigError(String),
}

impl ForecastError {
    /// Whether this error must stop the whole batch rather than a single site
    pub fn is_fatal(&self) -> bool {
        matches!(self, ForecastError::FatalConfiguration(_))
    }
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        ForecastError::CsvError(err.to_string())
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::JsonError(err.to_string())
    }
}

impl From<toml::de::Error> for ForecastError {
    fn from(err: toml::de::Error) -> Self {
        ForecastError::ConfigError(err.to_string())
    }
}

impl From<MathError> for ForecastError {
    fn from(err: MathError) -> Self {
        match err {
            MathError::InvalidInput(msg) => ForecastError::InvalidParameter(msg),
            MathError::InsufficientData(msg) | MathError::CalculationError(msg) => {
                ForecastError::InvalidHistory(msg)
            }
        }
    }
}
