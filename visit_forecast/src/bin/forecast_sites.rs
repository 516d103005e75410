use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use visit_forecast::{forecast_all, ForecastConfig, HistoryTable, LinearModel, Result};

#[derive(Parser, Debug)]
#[command(name = "forecast-sites")]
#[command(about = "Recursive monthly visitation forecast for every site in a history table")]
struct Args {
    /// Historical table with site, year, month and value columns.
    #[arg(long)]
    history: PathBuf,

    /// Trained model artifact (JSON).
    #[arg(long)]
    model: PathBuf,

    /// Output path for the forecast table CSV.
    #[arg(long, default_value = "forecast_all_sites.csv")]
    output: PathBuf,

    /// Optional TOML file with horizon, low_q, high_q and workers.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Months to forecast per site (overrides the config file).
    #[arg(long)]
    horizon: Option<usize>,

    /// Lower crowd quantile (overrides the config file).
    #[arg(long)]
    low_q: Option<f64>,

    /// Upper crowd quantile (overrides the config file).
    #[arg(long)]
    high_q: Option<f64>,

    /// Worker threads for the site pool (overrides the config file).
    #[arg(long)]
    workers: Option<usize>,
}

impl Args {
    fn forecast_config(&self) -> Result<ForecastConfig> {
        let mut config = match &self.config {
            Some(path) => ForecastConfig::from_toml_file(path)?,
            None => ForecastConfig::default(),
        };

        if let Some(horizon) = self.horizon {
            config = config.with_horizon(horizon);
        }
        let low_q = self.low_q.unwrap_or(config.low_q);
        let high_q = self.high_q.unwrap_or(config.high_q);
        config = config.with_quantiles(low_q, high_q);
        if let Some(workers) = self.workers {
            config = config.with_workers(workers);
        }

        config.validate()?;
        Ok(config)
    }
}

fn run(args: &Args) -> Result<()> {
    let config = args.forecast_config()?;

    // Fatal problems surface here, before any site is touched
    let model = LinearModel::from_json_file(&args.model)?;
    let history = HistoryTable::from_csv(&args.history)?;

    let output = forecast_all(&history, &model, config)?;
    output.table.write_csv(&args.output)?;

    println!("{}", output.report);
    println!(
        "Saved {} rows for {} sites to {}",
        output.table.len(),
        output.report.sites_succeeded,
        args.output.display()
    );
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "visit_forecast=info,forecast_sites=info".into()),
        )
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "forecast run failed");
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}
