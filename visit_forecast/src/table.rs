//! Forecast output: points, the aggregate table and its read-only queries

use crate::data::site_key;
use crate::error::Result;
use crate::thresholds::CrowdLevel;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Column order of the persisted forecast artifact
pub const FORECAST_COLUMNS: [&str; 7] = [
    "site",
    "year",
    "month",
    "predicted_visits",
    "crowd_level",
    "low_threshold",
    "high_threshold",
];

/// One forecast month for one site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub site: String,
    pub year: i32,
    pub month: u32,
    pub predicted_visits: f64,
    pub crowd_level: CrowdLevel,
    pub low_threshold: f64,
    pub high_threshold: f64,
}

/// Forecasts for every successful site, in site-then-chronological order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastTable {
    points: Vec<ForecastPoint>,
}

impl ForecastTable {
    pub fn new(points: Vec<ForecastPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    pub fn into_points(self) -> Vec<ForecastPoint> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Distinct site names, ordered by site key like the batch output
    pub fn sites(&self) -> Vec<String> {
        let mut sites: Vec<String> = self.points.iter().map(|p| p.site.clone()).collect();
        sites.sort_by_cached_key(|s| site_key(s));
        sites.dedup_by(|a, b| site_key(a) == site_key(b));
        sites
    }

    /// First `months` points of one site, matched case-insensitively
    pub fn for_site(&self, site: &str, months: usize) -> Vec<&ForecastPoint> {
        let key = site_key(site);
        let mut points: Vec<&ForecastPoint> = self
            .points
            .iter()
            .filter(|p| site_key(&p.site) == key)
            .collect();
        points.sort_by_key(|p| (p.year, p.month));
        points.truncate(months);
        points
    }

    /// The `index`-th forecast month of every site (0 is the first month).
    ///
    /// Sites with fewer than `index + 1` points are left out.
    pub fn step(&self, index: usize) -> Vec<&ForecastPoint> {
        self.sites()
            .iter()
            .filter_map(|site| self.for_site(site, index + 1).get(index).copied())
            .collect()
    }

    /// Write the flat artifact consumed by the serving layer
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = ::csv::Writer::from_path(path)?;
        if self.points.is_empty() {
            writer.write_record(FORECAST_COLUMNS)?;
        }
        for point in &self.points {
            writer.serialize(point)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Same columns as the CSV artifact, as a DataFrame
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let sites: Vec<&str> = self.points.iter().map(|p| p.site.as_str()).collect();
        let years: Vec<i32> = self.points.iter().map(|p| p.year).collect();
        let months: Vec<u32> = self.points.iter().map(|p| p.month).collect();
        let predicted: Vec<f64> = self.points.iter().map(|p| p.predicted_visits).collect();
        let levels: Vec<&str> = self.points.iter().map(|p| p.crowd_level.as_str()).collect();
        let lows: Vec<f64> = self.points.iter().map(|p| p.low_threshold).collect();
        let highs: Vec<f64> = self.points.iter().map(|p| p.high_threshold).collect();

        let df = DataFrame::new(vec![
            Series::new(FORECAST_COLUMNS[0], sites),
            Series::new(FORECAST_COLUMNS[1], years),
            Series::new(FORECAST_COLUMNS[2], months),
            Series::new(FORECAST_COLUMNS[3], predicted),
            Series::new(FORECAST_COLUMNS[4], levels),
            Series::new(FORECAST_COLUMNS[5], lows),
            Series::new(FORECAST_COLUMNS[6], highs),
        ])?;

        Ok(df)
    }
}
