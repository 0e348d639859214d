use ag_analytics::{AnalysisConfig, HealthCheckEngine};
use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

mod prices;

#[derive(Parser, Debug)]
#[clap(name = "healthcheck", about = "Portfolio beta / correlation / allocation health check")]
struct Args {
    /// Analysis configuration (YAML or JSON)
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Closing prices as JSON: { "SYMBOL": [{ "date": ..., "close": ... }] }
    #[clap(short, long)]
    prices: PathBuf,

    /// Last day of the lookback window (defaults to today)
    #[clap(long)]
    as_of: Option<NaiveDate>,

    /// Override the Monte Carlo seed
    #[clap(long)]
    seed: Option<u64>,

    /// Override the number of simulated portfolios
    #[clap(long)]
    samples: Option<usize>,

    /// Skip symbols without price history instead of failing
    #[clap(long)]
    allow_unresolved: bool,

    /// Pretty-print the JSON report
    #[clap(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    // Initialize tracing; logs go to stderr so stdout stays pure JSON
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            AnalysisConfig::from_file(path)
                .with_context(|| format!("Failed to load configuration {:?}", path))?
        }
        None => {
            info!("No configuration given, using defaults");
            AnalysisConfig::default()
        }
    };

    if let Some(seed) = args.seed {
        config.simulation.random_seed = Some(seed);
    }
    if let Some(samples) = args.samples {
        config.simulation.num_portfolios = samples;
    }
    if args.allow_unresolved {
        config.allow_unresolved = true;
    }

    info!("Loading prices from {:?}", args.prices);
    let prices = prices::load_price_table(&args.prices)?;
    info!(
        symbols = prices.num_symbols(),
        rows = prices.num_rows(),
        "Loaded price table"
    );

    let as_of = args.as_of.unwrap_or_else(|| Local::now().date_naive());
    let engine = HealthCheckEngine::new(config)?;
    let report = engine.run(&prices, as_of)?;

    let output = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{}", output);

    Ok(())
}
