//! # Park Pulse
//!
//! Umbrella crate for the park visitation forecaster. It re-exports the two
//! workspace members so downstream code can depend on a single crate.
//!
//! ## Example
//!
//! ```
//! use park_pulse_workspace::{next_month, Season};
//!
//! assert_eq!(next_month(2023, 12).unwrap(), (2024, 1));
//! assert_eq!(Season::from_month(7).unwrap(), Season::Summer);
//! ```

pub use visit_forecast;
pub use visit_math;

pub use visit_forecast::{
    forecast_all, forecast_site, BatchOutput, BatchReport, CrowdLevel, CrowdThresholds,
    ForecastConfig, ForecastError, ForecastPoint, ForecastTable, HistoryTable, LinearModel,
    RecursiveForecaster, RegressionModel,
};
pub use visit_math::{next_month, Season};

/// Crate version, taken from the manifest
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
