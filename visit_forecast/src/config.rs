//! Batch configuration

use crate::error::{ForecastError, Result};
use crate::thresholds::{CrowdThresholds, DEFAULT_HIGH_Q, DEFAULT_LOW_Q};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Horizon used when none is configured
pub const DEFAULT_HORIZON: usize = 36;
/// Largest horizon the serving layer accepts
pub const MAX_HORIZON: usize = 120;

/// Settings for one forecasting batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForecastConfig {
    /// Months to forecast per site
    pub horizon: usize,
    /// Quantile of observed values separating low from medium
    pub low_q: f64,
    /// Quantile of observed values separating medium from high
    pub high_q: f64,
    /// Worker threads for the site pool; `None` uses one per core
    pub workers: Option<usize>,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon: DEFAULT_HORIZON,
            low_q: DEFAULT_LOW_Q,
            high_q: DEFAULT_HIGH_Q,
            workers: None,
        }
    }
}

impl ForecastConfig {
    /// Read a TOML file; fields left out keep their defaults
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| {
            ForecastError::FatalConfiguration(format!(
                "Cannot read config {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: ForecastConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn with_quantiles(mut self, low_q: f64, high_q: f64) -> Self {
        self.low_q = low_q;
        self.high_q = high_q;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Check every field is in range
    pub fn validate(&self) -> Result<()> {
        if self.horizon > MAX_HORIZON {
            return Err(ForecastError::InvalidParameter(format!(
                "Horizon must be at most {} months, got {}",
                MAX_HORIZON, self.horizon
            )));
        }

        CrowdThresholds::validate_quantiles(self.low_q, self.high_q)?;

        if self.workers == Some(0) {
            return Err(ForecastError::InvalidParameter(
                "Worker count must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
