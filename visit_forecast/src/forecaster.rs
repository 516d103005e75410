//! Recursive multi-step forecasting for a single site
//!
//! Each step builds features from the value buffer, asks the model for a
//! prediction and appends that prediction to the buffer, so step `t + 1`
//! sees step `t`'s output as its most recent lag.

use crate::data::SiteHistory;
use crate::error::{ForecastError, Result};
use crate::features::{build_features, FeatureVector, MIN_HISTORY};
use crate::models::RegressionModel;
use crate::table::ForecastPoint;
use crate::thresholds::{CrowdThresholds, DEFAULT_HIGH_Q, DEFAULT_LOW_Q};
use tracing::{debug, trace};
use visit_math::next_month;

/// Forecaster state for one site, consumed by [`RecursiveForecaster::run`]
#[derive(Debug, Clone)]
pub struct RecursiveForecaster {
    site: String,
    values: Vec<f64>,
    year: i32,
    month: u32,
    thresholds: CrowdThresholds,
}

impl RecursiveForecaster {
    /// Initialize with the default quantiles (0.40 / 0.70)
    pub fn new(history: &SiteHistory) -> Result<Self> {
        Self::with_quantiles(history, DEFAULT_LOW_Q, DEFAULT_HIGH_Q)
    }

    /// Copy the site's values into a private buffer and calibrate thresholds once
    pub fn with_quantiles(history: &SiteHistory, low_q: f64, high_q: f64) -> Result<Self> {
        let site = history.site().to_string();
        if history.len() < MIN_HISTORY {
            return Err(ForecastError::InsufficientHistory {
                site,
                required: MIN_HISTORY,
                found: history.len(),
            });
        }

        let values = history.values();
        let thresholds = CrowdThresholds::from_history(&site, &values, low_q, high_q)?;
        let (year, month) = history.last_period().ok_or_else(|| {
            ForecastError::EmptyHistory(site.clone())
        })?;

        Ok(Self {
            site,
            values,
            year,
            month,
            thresholds,
        })
    }

    pub fn site(&self) -> &str {
        &self.site
    }

    pub fn thresholds(&self) -> CrowdThresholds {
        self.thresholds
    }

    /// Current buffer: history followed by predictions made so far
    pub fn buffer(&self) -> &[f64] {
        &self.values
    }

    /// Last period in the buffer
    pub fn last_period(&self) -> (i32, u32) {
        (self.year, self.month)
    }

    /// Advance one month: features, prediction, classification, buffer append
    pub fn step(&mut self, model: &dyn RegressionModel) -> Result<ForecastPoint> {
        let (year, month) = next_month(self.year, self.month)?;
        let features = build_features(&self.values, year, month)?;
        let predicted = self.predict(model, &features)?;
        let crowd_level = self.thresholds.classify(predicted);

        trace!(
            site = %self.site,
            year,
            month,
            lag_1 = features.lag_1,
            predicted,
            %crowd_level,
            "forecast step"
        );

        self.values.push(predicted);
        self.year = year;
        self.month = month;

        Ok(ForecastPoint {
            site: self.site.clone(),
            year,
            month,
            predicted_visits: predicted,
            crowd_level,
            low_threshold: self.thresholds.low,
            high_threshold: self.thresholds.high,
        })
    }

    /// Run `horizon` steps and return the points in chronological order
    pub fn run(mut self, model: &dyn RegressionModel, horizon: usize) -> Result<Vec<ForecastPoint>> {
        debug!(site = %self.site, horizon, history = self.values.len(), "forecasting site");

        let mut points = Vec::with_capacity(horizon);
        for _ in 0..horizon {
            points.push(self.step(model)?);
        }

        Ok(points)
    }

    fn predict(&self, model: &dyn RegressionModel, features: &FeatureVector) -> Result<f64> {
        let predicted = model.predict(features).map_err(|err| match err {
            ForecastError::FatalConfiguration(_) | ForecastError::ModelInference(_) => err,
            other => ForecastError::ModelInference(format!(
                "{} failed for site '{}': {}",
                model.name(),
                self.site,
                other
            )),
        })?;

        if !predicted.is_finite() {
            return Err(ForecastError::ModelInference(format!(
                "{} returned non-finite prediction {} for site '{}' at {}-{:02}",
                model.name(),
                predicted,
                self.site,
                features.year,
                features.month
            )));
        }

        Ok(predicted)
    }
}

/// Forecast one site end to end
pub fn forecast_site(
    history: &SiteHistory,
    model: &dyn RegressionModel,
    horizon: usize,
    low_q: f64,
    high_q: f64,
) -> Result<Vec<ForecastPoint>> {
    RecursiveForecaster::with_quantiles(history, low_q, high_q)?.run(model, horizon)
}
