//! Feature construction for one forecast step
//!
//! Features are computed from the value buffer alone. The buffer holds the
//! observed history followed by every prediction made so far, and the builder
//! cannot tell the two apart.

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use visit_math::{lag, trailing_mean, Season};

/// Longest lag used by the features; the minimum buffer length
pub const MIN_HISTORY: usize = 12;

/// Model input for a single (year, month)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub year: i32,
    pub month: u32,
    pub season: Season,
    pub lag_1: f64,
    pub lag_3: f64,
    pub lag_12: f64,
    pub roll_mean_3: f64,
    pub roll_mean_6: f64,
}

impl FeatureVector {
    /// Numeric features in a fixed order, paired with their names
    pub fn numeric(&self) -> [(&'static str, f64); 7] {
        [
            ("year", self.year as f64),
            ("month", self.month as f64),
            ("lag_1", self.lag_1),
            ("lag_3", self.lag_3),
            ("lag_12", self.lag_12),
            ("roll_mean_3", self.roll_mean_3),
            ("roll_mean_6", self.roll_mean_6),
        ]
    }

    /// One-hot encoding of the season in [`Season::ALL`] order
    pub fn season_one_hot(&self) -> [f64; 4] {
        let mut encoded = [0.0; 4];
        if let Some(pos) = Season::ALL.iter().position(|s| *s == self.season) {
            encoded[pos] = 1.0;
        }
        encoded
    }
}

/// Build the feature vector for `(year, month)` from the current buffer
pub fn build_features(values: &[f64], year: i32, month: u32) -> Result<FeatureVector> {
    if values.len() < MIN_HISTORY {
        return Err(ForecastError::InsufficientHistory {
            site: String::new(),
            required: MIN_HISTORY,
            found: values.len(),
        });
    }

    Ok(FeatureVector {
        year,
        month,
        season: Season::from_month(month)?,
        lag_1: lag(values, 1)?,
        lag_3: lag(values, 3)?,
        lag_12: lag(values, 12)?,
        roll_mean_3: trailing_mean(values, 3)?,
        roll_mean_6: trailing_mean(values, 6)?,
    })
}
