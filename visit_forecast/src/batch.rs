//! Batch forecasting across every site in a history table
//!
//! Sites are independent, so they run on a bounded rayon pool with one
//! [`RecursiveForecaster`](crate::forecaster::RecursiveForecaster) each. A
//! failing site is recorded and skipped; only a fatal error stops the batch.

use crate::config::ForecastConfig;
use crate::data::{HistoryTable, SiteRows};
use crate::error::{ForecastError, Result};
use crate::forecaster::forecast_site;
use crate::models::RegressionModel;
use crate::table::{ForecastPoint, ForecastTable};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tracing::{error, info, warn};

/// A site left out of the forecast table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedSite {
    pub site: String,
    pub reason: String,
}

/// Summary of a batch run
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// When the batch finished
    pub generated_at: DateTime<Utc>,
    /// Distinct sites found in the history
    pub sites_processed: usize,
    /// Sites present in the forecast table
    pub sites_succeeded: usize,
    /// Every skipped site with its reason, sorted by site
    pub skipped: Vec<SkippedSite>,
    /// History rows dropped as malformed before grouping
    pub dropped_rows: usize,
}

impl BatchReport {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// True when no site was skipped and no row dropped
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty() && self.dropped_rows == 0
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Forecast Batch Report ({}):", self.generated_at.to_rfc3339())?;
        writeln!(f, "  Sites processed: {}", self.sites_processed)?;
        writeln!(f, "  Sites forecast:  {}", self.sites_succeeded)?;
        writeln!(f, "  Sites skipped:   {}", self.skipped.len())?;
        writeln!(f, "  Rows dropped:    {}", self.dropped_rows)?;
        for skipped in &self.skipped {
            writeln!(f, "    - {}: {}", skipped.site, skipped.reason)?;
        }
        Ok(())
    }
}

/// Forecast table plus the report describing how it was produced
#[derive(Debug, Clone)]
pub struct BatchOutput {
    pub table: ForecastTable,
    pub report: BatchReport,
}

enum SiteOutcome {
    Forecast(Vec<ForecastPoint>),
    Skipped(SkippedSite),
    Fatal(ForecastError),
    NotStarted,
}

/// Runs the recursive forecaster for every site with partial-failure tolerance
#[derive(Debug)]
pub struct BatchOrchestrator<'m> {
    model: &'m dyn RegressionModel,
    config: ForecastConfig,
}

impl<'m> BatchOrchestrator<'m> {
    /// Create an orchestrator; an invalid configuration is rejected up front
    pub fn new(model: &'m dyn RegressionModel, config: ForecastConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { model, config })
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Forecast every site in `history`.
    ///
    /// Per-site errors end up in the report. A fatal error stops new sites from
    /// starting and is returned instead of a partial table.
    pub fn run(&self, history: &HistoryTable) -> Result<BatchOutput> {
        let sites = history.sites();
        let total = sites.len();
        info!(
            sites = total,
            horizon = self.config.horizon,
            model = self.model.name(),
            "starting forecast batch"
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.workers.unwrap_or(0))
            .build()
            .map_err(|e| {
                ForecastError::FatalConfiguration(format!("Cannot start worker pool: {}", e))
            })?;

        let abort = AtomicBool::new(false);
        let completed = AtomicUsize::new(0);

        // `collect` keeps the input order, which is already sorted by site key
        let outcomes: Vec<(String, SiteOutcome)> = pool.install(|| {
            sites
                .into_par_iter()
                .map(|site| {
                    let name = site.name.clone();
                    let outcome = self.forecast_one(site, &abort);
                    let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                    if done % 10 == 0 || done == total {
                        info!(done, total, "forecast progress");
                    }
                    (name, outcome)
                })
                .collect()
        });

        let mut points = Vec::new();
        let mut skipped = Vec::new();
        let mut succeeded = 0;
        for (name, outcome) in outcomes {
            match outcome {
                SiteOutcome::Forecast(site_points) => {
                    succeeded += 1;
                    points.extend(site_points);
                }
                SiteOutcome::Skipped(site) => skipped.push(site),
                SiteOutcome::Fatal(err) => {
                    error!(site = %name, error = %err, "aborting forecast batch");
                    return Err(err);
                }
                SiteOutcome::NotStarted => {}
            }
        }

        let report = BatchReport {
            generated_at: Utc::now(),
            sites_processed: total,
            sites_succeeded: succeeded,
            skipped,
            dropped_rows: history.dropped().len(),
        };
        info!(
            forecast = report.sites_succeeded,
            skipped = report.skipped_count(),
            rows = points.len(),
            "forecast batch finished"
        );

        Ok(BatchOutput {
            table: ForecastTable::new(points),
            report,
        })
    }

    fn forecast_one(&self, site: SiteRows, abort: &AtomicBool) -> SiteOutcome {
        if abort.load(Ordering::SeqCst) {
            return SiteOutcome::NotStarted;
        }

        let name = site.name.clone();
        let result = site.into_history().and_then(|history| {
            forecast_site(
                &history,
                self.model,
                self.config.horizon,
                self.config.low_q,
                self.config.high_q,
            )
        });

        match result {
            Ok(points) => SiteOutcome::Forecast(points),
            Err(err) if err.is_fatal() => {
                abort.store(true, Ordering::SeqCst);
                SiteOutcome::Fatal(err)
            }
            Err(err) => {
                warn!(site = %name, reason = %err, "skipping site");
                SiteOutcome::Skipped(SkippedSite {
                    site: name,
                    reason: err.to_string(),
                })
            }
        }
    }
}

/// Forecast every site in `history` with `model` and `config`
pub fn forecast_all(
    history: &HistoryTable,
    model: &dyn RegressionModel,
    config: ForecastConfig,
) -> Result<BatchOutput> {
    BatchOrchestrator::new(model, config)?.run(history)
}
