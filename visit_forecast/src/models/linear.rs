//! Linear regression artifact for monthly visitation

use crate::error::{ForecastError, Result};
use crate::features::FeatureVector;
use crate::models::RegressionModel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use visit_math::Season;

const FEATURE_NAMES: [&str; 7] = [
    "year",
    "month",
    "lag_1",
    "lag_3",
    "lag_12",
    "roll_mean_3",
    "roll_mean_6",
];

/// Linear model over the numeric features plus a per-season offset.
///
/// Persisted as JSON:
///
/// ```json
/// {
///   "name": "monthly-linear",
///   "intercept": 120.0,
///   "coefficients": { "lag_1": 0.6, "lag_12": 0.3 },
///   "season_offsets": { "summer": 1500.0 }
/// }
/// ```
///
/// Features missing from `coefficients` or `season_offsets` contribute zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    #[serde(default = "default_name")]
    name: String,
    intercept: f64,
    #[serde(default)]
    coefficients: BTreeMap<String, f64>,
    #[serde(default)]
    season_offsets: BTreeMap<String, f64>,
}

fn default_name() -> String {
    "Linear Model".to_string()
}

impl LinearModel {
    /// Create a model that predicts `intercept` until coefficients are added
    pub fn new(intercept: f64) -> Self {
        Self {
            name: default_name(),
            intercept,
            coefficients: BTreeMap::new(),
            season_offsets: BTreeMap::new(),
        }
    }

    /// Set the coefficient of a numeric feature
    pub fn with_coefficient(mut self, feature: &str, coefficient: f64) -> Result<Self> {
        if !FEATURE_NAMES.contains(&feature) {
            return Err(ForecastError::InvalidParameter(format!(
                "Unknown feature '{}'",
                feature
            )));
        }
        self.coefficients.insert(feature.to_string(), coefficient);
        Ok(self)
    }

    /// Set the additive offset for a season
    pub fn with_season_offset(mut self, season: Season, offset: f64) -> Self {
        self.season_offsets.insert(season.as_str().to_string(), offset);
        self
    }

    /// Load a persisted model. Any failure here is fatal for a batch.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| {
            ForecastError::FatalConfiguration(format!(
                "Cannot read model {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_json_str(&raw).map_err(|e| {
            ForecastError::FatalConfiguration(format!(
                "Cannot load model {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Parse and validate a model from JSON
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let model: LinearModel = serde_json::from_str(raw)?;
        model.validate()?;
        Ok(model)
    }

    /// Serialize the model to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn validate(&self) -> Result<()> {
        if !self.intercept.is_finite() {
            return Err(ForecastError::InvalidParameter(
                "Intercept must be finite".to_string(),
            ));
        }

        for (feature, coefficient) in &self.coefficients {
            if !FEATURE_NAMES.contains(&feature.as_str()) {
                return Err(ForecastError::InvalidParameter(format!(
                    "Unknown feature '{}'",
                    feature
                )));
            }
            if !coefficient.is_finite() {
                return Err(ForecastError::InvalidParameter(format!(
                    "Coefficient for '{}' must be finite",
                    feature
                )));
            }
        }

        for (season, offset) in &self.season_offsets {
            if !Season::ALL.iter().any(|s| s.as_str() == season) {
                return Err(ForecastError::InvalidParameter(format!(
                    "Unknown season '{}'",
                    season
                )));
            }
            if !offset.is_finite() {
                return Err(ForecastError::InvalidParameter(format!(
                    "Offset for season '{}' must be finite",
                    season
                )));
            }
        }

        Ok(())
    }
}

impl RegressionModel for LinearModel {
    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        let linear: f64 = features
            .numeric()
            .iter()
            .map(|(name, value)| self.coefficients.get(*name).copied().unwrap_or(0.0) * value)
            .sum();
        let seasonal = self
            .season_offsets
            .get(features.season.as_str())
            .copied()
            .unwrap_or(0.0);

        Ok(self.intercept + linear + seasonal)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
