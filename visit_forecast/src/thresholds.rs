//! Per-site crowd level calibration

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use visit_math::quantile;

/// Default lower quantile for the low/medium boundary
pub const DEFAULT_LOW_Q: f64 = 0.40;
/// Default upper quantile for the medium/high boundary
pub const DEFAULT_HIGH_Q: f64 = 0.70;

/// Ordinal crowd classification of a predicted value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrowdLevel {
    Low,
    Medium,
    High,
}

impl CrowdLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            CrowdLevel::Low => "low",
            CrowdLevel::Medium => "medium",
            CrowdLevel::High => "high",
        }
    }
}

impl fmt::Display for CrowdLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Low/high boundaries taken from a site's observed history
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrowdThresholds {
    pub low: f64,
    pub high: f64,
}

impl CrowdThresholds {
    /// Check that a quantile pair is usable
    pub fn validate_quantiles(low_q: f64, high_q: f64) -> Result<()> {
        for (name, q) in [("low_q", low_q), ("high_q", high_q)] {
            if !(q > 0.0 && q < 1.0) {
                return Err(ForecastError::InvalidParameter(format!(
                    "{} must be between 0 and 1 (exclusive), got {}",
                    name, q
                )));
            }
        }
        if low_q > high_q {
            return Err(ForecastError::InvalidParameter(format!(
                "low_q ({}) must not exceed high_q ({})",
                low_q, high_q
            )));
        }
        Ok(())
    }

    /// Thresholds at the `low_q` and `high_q` quantiles of the observed values.
    ///
    /// Non-finite values are ignored; a series with nothing left is an
    /// `EmptyHistory` for `site`.
    pub fn from_history(site: &str, values: &[f64], low_q: f64, high_q: f64) -> Result<Self> {
        Self::validate_quantiles(low_q, high_q)?;

        if !values.iter().any(|v| v.is_finite()) {
            return Err(ForecastError::EmptyHistory(site.to_string()));
        }

        Ok(Self {
            low: quantile(values, low_q)?,
            high: quantile(values, high_q)?,
        })
    }

    /// Half-open classification: `low` is medium, `high` is high
    pub fn classify(&self, value: f64) -> CrowdLevel {
        if value < self.low {
            CrowdLevel::Low
        } else if value < self.high {
            CrowdLevel::Medium
        } else {
            CrowdLevel::High
        }
    }
}
