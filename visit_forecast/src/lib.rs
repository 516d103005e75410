//! # Visit Forecast
//!
//! Recursive multi-step forecasting of monthly visitation for many
//! independent sites with one shared regression model.
//!
//! ## Features
//!
//! - History loading from CSV or a polars `DataFrame`, dropping malformed rows
//! - Lag and rolling-mean features built from a per-site value buffer
//! - Per-site crowd thresholds from historical quantiles (low / medium / high)
//! - A recursive forecaster that feeds each prediction back into its buffer
//! - A batch orchestrator running sites in parallel and reporting skipped ones
//!
//! ## Quick Start
//!
//! ```no_run
//! use visit_forecast::{forecast_all, ForecastConfig, HistoryTable, LinearModel};
//!
//! # fn main() -> visit_forecast::Result<()> {
//! let history = HistoryTable::from_csv("modeling_dataset_monthly.csv")?;
//! let model = LinearModel::from_json_file("monthly_model.json")?;
//!
//! let output = forecast_all(&history, &model, ForecastConfig::default())?;
//! output.table.write_csv("forecast_all_sites.csv")?;
//! println!("{}", output.report);
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod config;
pub mod data;
pub mod error;
pub mod features;
pub mod forecaster;
pub mod models;
pub mod table;
pub mod thresholds;

// Re-export commonly used types
pub use crate::batch::{forecast_all, BatchOrchestrator, BatchOutput, BatchReport, SkippedSite};
pub use crate::config::ForecastConfig;
pub use crate::data::{HistoryRow, HistoryTable, SiteHistory, TimeSeriesPoint};
pub use crate::error::{ForecastError, Result};
pub use crate::features::{build_features, FeatureVector, MIN_HISTORY};
pub use crate::forecaster::{forecast_site, RecursiveForecaster};
pub use crate::models::{ExclusiveModel, FnModel, LinearModel, RegressionModel, SerializedModel};
pub use crate::table::{ForecastPoint, ForecastTable};
pub use crate::thresholds::{CrowdLevel, CrowdThresholds};
pub use visit_math::Season;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
