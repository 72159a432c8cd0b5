//! spendcast: month-end spending projection
//!
//! Reads a JSON array of `{date, category, amount}` records on stdin and
//! prints a single JSON object mapping each category to its projected
//! month-end total. Diagnostics go to stderr; any failure yields `{}`.
//!
//! Usage:
//!   spendcast < expenses.json
//!   spendcast --history training_data.json --as-of 2025-07-17 -vv < expenses.json

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use forecast_spend::{Prediction, Predictor, PredictorConfig, RecordPolicy};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Project month-end spending per category from this month's expenses
#[derive(Parser, Debug)]
#[command(name = "spendcast")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// JSON configuration file (forecaster and predictor settings)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Supplementary historical records file
    #[arg(long)]
    history: Option<PathBuf>,

    /// Date used as "today" when no expenses are supplied (YYYY-MM-DD)
    #[arg(long)]
    as_of: Option<NaiveDate>,

    /// Skip malformed records instead of failing the whole payload
    #[arg(long)]
    skip_invalid: bool,
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // stdout carries the prediction only
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn load_config(cli: &Cli) -> Result<PredictorConfig> {
    let mut config = match &cli.config {
        Some(path) => PredictorConfig::from_json_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => PredictorConfig::default(),
    };

    if let Some(history) = &cli.history {
        config.history_path = history.clone();
    }
    if cli.skip_invalid {
        config.record_policy = RecordPolicy::SkipInvalid;
    }

    debug!("Configuration: {:?}", config);
    Ok(config)
}

fn predict(cli: &Cli) -> Result<Prediction> {
    let config = load_config(cli)?;
    let predictor = Predictor::new(config).context("building predictor")?;

    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("reading expenses from stdin")?;

    let today = cli.as_of.unwrap_or_else(|| Local::now().date_naive());
    Ok(predictor.run_or_empty(&input, today))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let prediction = predict(&cli).unwrap_or_else(|e| {
        error!("{:#}", e);
        Prediction::empty()
    });

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{}", prediction.to_json_line())?;
    out.flush()?;

    Ok(())
}
