//! # Visit Math
//!
//! Numeric building blocks for monthly visitation forecasting.
//! This crate provides the buffer lookups (lags and trailing means),
//! interpolated quantiles and the calendar arithmetic that the
//! forecasting engine composes into feature vectors.

use thiserror::Error;

pub mod calendar;
pub mod quantile;
pub mod rolling;

pub use calendar::{next_month, Season};
pub use quantile::quantile;
pub use rolling::{lag, trailing_mean};

/// Errors that can occur in forecasting math
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for visit math operations
pub type Result<T> = std::result::Result<T, MathError>;
