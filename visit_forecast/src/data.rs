//! Historical monthly visitation data

use crate::error::{ForecastError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};
use visit_math::next_month;

/// Accepted header spellings for the site identifier column
const SITE_COLUMNS: [&str; 5] = ["site", "sitename", "siteid", "parkname", "park"];
/// Accepted header spellings for the observed monthly value column
const VALUE_COLUMNS: [&str; 5] = [
    "value",
    "observedvalue",
    "targetvisits",
    "recreationvisits",
    "visits",
];

/// One observed (or predicted) monthly value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    /// Calendar year
    pub year: i32,
    /// Calendar month, 1 to 12
    pub month: u32,
    /// Visitation count
    pub value: f64,
}

impl TimeSeriesPoint {
    /// Create a validated point
    pub fn new(year: i32, month: u32, value: f64) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(ForecastError::InvalidParameter(format!(
                "Month must be between 1 and 12, got {}",
                month
            )));
        }
        if !value.is_finite() {
            return Err(ForecastError::InvalidParameter(format!(
                "Value must be finite, got {}",
                value
            )));
        }

        Ok(Self { year, month, value })
    }

    /// The (year, month) pair, ordered chronologically
    pub fn period(&self) -> (i32, u32) {
        (self.year, self.month)
    }
}

/// One row of the historical table
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow {
    /// Site identifier as written in the source, trimmed
    pub site: String,
    /// The observation
    pub point: TimeSeriesPoint,
}

impl HistoryRow {
    pub fn new(site: impl Into<String>, point: TimeSeriesPoint) -> Self {
        Self {
            site: site.into().trim().to_string(),
            point,
        }
    }
}

/// A source row that could not be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedRow {
    /// 1-based line in the source (header is line 1 for CSV input)
    pub line: usize,
    /// Why the row was rejected
    pub reason: String,
}

/// Matching key for a site identifier: whitespace-trimmed and lowercased
pub fn site_key(site: &str) -> String {
    site.trim().to_lowercase()
}

/// Ordered, gap-free monthly history for one site
#[derive(Debug, Clone, PartialEq)]
pub struct SiteHistory {
    site: String,
    points: Vec<TimeSeriesPoint>,
}

impl SiteHistory {
    /// Sort points chronologically and check they form a contiguous monthly series
    pub fn new(site: impl Into<String>, mut points: Vec<TimeSeriesPoint>) -> Result<Self> {
        let site = site.into();
        points.sort_by_key(|p| p.period());

        for pair in points.windows(2) {
            let (prev, cur) = (pair[0].period(), pair[1].period());
            if prev == cur {
                return Err(ForecastError::InvalidHistory(format!(
                    "site '{}' has duplicate records for {}-{:02}",
                    site, cur.0, cur.1
                )));
            }
            let expected = next_month(prev.0, prev.1)?;
            if expected != cur {
                return Err(ForecastError::InvalidHistory(format!(
                    "site '{}' has a gap between {}-{:02} and {}-{:02}",
                    site, prev.0, prev.1, cur.0, cur.1
                )));
            }
        }

        Ok(Self { site, points })
    }

    /// Build a history from consecutive values starting at `(year, month)`
    pub fn from_values(
        site: impl Into<String>,
        start_year: i32,
        start_month: u32,
        values: &[f64],
    ) -> Result<Self> {
        let mut points = Vec::with_capacity(values.len());
        let (mut year, mut month) = (start_year, start_month);
        for &value in values {
            points.push(TimeSeriesPoint::new(year, month, value)?);
            (year, month) = next_month(year, month)?;
        }

        Self::new(site, points)
    }

    pub fn site(&self) -> &str {
        &self.site
    }

    pub fn points(&self) -> &[TimeSeriesPoint] {
        &self.points
    }

    /// Observed values in chronological order
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Last observed (year, month), if any
    pub fn last_period(&self) -> Option<(i32, u32)> {
        self.points.last().map(|p| p.period())
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// All rows belonging to one site, before validation
#[derive(Debug, Clone, PartialEq)]
pub struct SiteRows {
    /// Matching key (see [`site_key`])
    pub key: String,
    /// First trimmed spelling seen in the source
    pub name: String,
    /// Points in source order
    pub points: Vec<TimeSeriesPoint>,
}

impl SiteRows {
    /// Validate into a [`SiteHistory`]
    pub fn into_history(self) -> Result<SiteHistory> {
        SiteHistory::new(self.name, self.points)
    }
}

/// Parsed historical table covering many sites
#[derive(Debug, Clone, Default)]
pub struct HistoryTable {
    rows: Vec<HistoryRow>,
    dropped: Vec<DroppedRow>,
}

impl HistoryTable {
    /// Load the historical table from a CSV file.
    ///
    /// A missing or unreadable file and a missing required column are fatal.
    /// Rows that fail to parse are dropped and recorded.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ForecastError::FatalConfiguration(format!(
                "History file not found: {}",
                path.display()
            )));
        }

        let mut reader = ::csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(::csv::Trim::All)
            .from_path(path)
            .map_err(|e| {
                ForecastError::FatalConfiguration(format!(
                    "Cannot open history {}: {}",
                    path.display(),
                    e
                ))
            })?;

        let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
        let columns = ColumnMap::detect(&headers)?;

        let mut table = HistoryTable::default();
        for (i, record) in reader.records().enumerate() {
            let line = i + 2;
            let parsed = record
                .map_err(|e| ForecastError::MalformedRow {
                    line,
                    reason: e.to_string(),
                })
                .and_then(|record| {
                    parse_row(
                        line,
                        record.get(columns.site),
                        record.get(columns.year),
                        record.get(columns.month),
                        record.get(columns.value),
                    )
                });
            table.push_parsed(parsed)?;
        }

        table.log_dropped(&path.display().to_string());
        Ok(table)
    }

    /// Create a table from a DataFrame that already holds the history
    pub fn from_dataframe(df: &DataFrame) -> Result<Self> {
        let headers: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        let columns = ColumnMap::detect(&headers)?;

        let sites = df.column(&headers[columns.site])?.cast(&DataType::Utf8)?;
        let years = df.column(&headers[columns.year])?.cast(&DataType::Float64)?;
        let months = df.column(&headers[columns.month])?.cast(&DataType::Float64)?;
        let values = df.column(&headers[columns.value])?.cast(&DataType::Float64)?;

        let mut table = HistoryTable::default();
        let rows = sites
            .utf8()?
            .into_iter()
            .zip(years.f64()?.into_iter())
            .zip(months.f64()?.into_iter())
            .zip(values.f64()?.into_iter());

        for (i, (((site, year), month), value)) in rows.enumerate() {
            let line = i + 1;
            let year = year.map(|y| y.to_string());
            let month = month.map(|m| m.to_string());
            let value = value.map(|v| v.to_string());
            let parsed = parse_row(
                line,
                site,
                year.as_deref(),
                month.as_deref(),
                value.as_deref(),
            );
            table.push_parsed(parsed)?;
        }

        table.log_dropped("dataframe");
        Ok(table)
    }

    /// Create a table from rows that are already parsed
    pub fn from_rows(rows: Vec<HistoryRow>) -> Self {
        Self {
            rows,
            dropped: Vec::new(),
        }
    }

    /// Record rows dropped by an upstream parser
    pub fn with_dropped(mut self, dropped: Vec<DroppedRow>) -> Self {
        self.dropped.extend(dropped);
        self
    }

    pub fn rows(&self) -> &[HistoryRow] {
        &self.rows
    }

    pub fn dropped(&self) -> &[DroppedRow] {
        &self.dropped
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Group rows by site key, sorted by key
    pub fn sites(&self) -> Vec<SiteRows> {
        let mut grouped: BTreeMap<String, SiteRows> = BTreeMap::new();
        for row in &self.rows {
            let key = site_key(&row.site);
            grouped
                .entry(key.clone())
                .or_insert_with(|| SiteRows {
                    key,
                    name: row.site.trim().to_string(),
                    points: Vec::new(),
                })
                .points
                .push(row.point);
        }

        grouped.into_values().collect()
    }

    fn push_parsed(&mut self, parsed: Result<HistoryRow>) -> Result<()> {
        match parsed {
            Ok(row) => self.rows.push(row),
            Err(ForecastError::MalformedRow { line, reason }) => {
                debug!(line, %reason, "dropping malformed history row");
                self.dropped.push(DroppedRow { line, reason });
            }
            Err(other) => return Err(other),
        }
        Ok(())
    }

    fn log_dropped(&self, source: &str) {
        if !self.dropped.is_empty() {
            warn!(
                source,
                dropped = self.dropped.len(),
                kept = self.rows.len(),
                "dropped malformed history rows"
            );
        }
    }
}

/// Positions of the required columns in a header row
#[derive(Debug, Clone, Copy)]
struct ColumnMap {
    site: usize,
    year: usize,
    month: usize,
    value: usize,
}

impl ColumnMap {
    fn detect(headers: &[String]) -> Result<Self> {
        Ok(Self {
            site: Self::find(headers, &SITE_COLUMNS, "site identifier")?,
            year: Self::find(headers, &["year"], "year")?,
            month: Self::find(headers, &["month"], "month")?,
            value: Self::find(headers, &VALUE_COLUMNS, "observed value")?,
        })
    }

    fn find(headers: &[String], candidates: &[&str], what: &str) -> Result<usize> {
        let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();

        // Earlier candidates win over later ones
        for candidate in candidates {
            if let Some(pos) = normalized.iter().position(|h| h == candidate) {
                return Ok(pos);
            }
        }

        Err(ForecastError::FatalConfiguration(format!(
            "No {} column found in history (columns: {})",
            what,
            headers.join(", ")
        )))
    }
}

fn normalize_header(header: &str) -> String {
    header
        .trim()
        .chars()
        .filter(|c| !matches!(c, '_' | ' ' | '-'))
        .flat_map(|c| c.to_lowercase())
        .collect()
}

fn parse_row(
    line: usize,
    site: Option<&str>,
    year: Option<&str>,
    month: Option<&str>,
    value: Option<&str>,
) -> Result<HistoryRow> {
    let malformed = |reason: String| ForecastError::MalformedRow { line, reason };

    let site = site.map(str::trim).unwrap_or_default();
    if site.is_empty() {
        return Err(malformed("missing site identifier".to_string()));
    }

    let year = parse_whole(year).ok_or_else(|| malformed(format!("invalid year {:?}", year)))?;
    let year = i32::try_from(year).map_err(|_| malformed(format!("year {} out of range", year)))?;

    let month =
        parse_whole(month).ok_or_else(|| malformed(format!("invalid month {:?}", month)))?;
    if !(1..=12).contains(&month) {
        return Err(malformed(format!("month {} outside 1..=12", month)));
    }

    let value = value
        .map(str::trim)
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .ok_or_else(|| malformed(format!("invalid value {:?}", value)))?;

    Ok(HistoryRow::new(
        site,
        TimeSeriesPoint {
            year,
            month: month as u32,
            value,
        },
    ))
}

/// Parse an integer field, accepting float spellings with no fractional part ("2020.0")
fn parse_whole(field: Option<&str>) -> Option<i64> {
    let field = field?.trim();
    if let Ok(n) = field.parse::<i64>() {
        return Some(n);
    }

    field
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64)
        .map(|f| f as i64)
}
