use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use faresweep_client::{ByteSource, ClientConfig, FareClient, FileSource, HttpSource};
use faresweep_search::{SearchConfig, SweepEngine, DEFAULT_CONCURRENCY};

mod report;

#[derive(Debug, Parser)]
#[command(name = "faresweep")]
#[command(about = "Sweep a window of dates for the cheapest award fare on a round trip")]
struct Cli {
    /// Origin airport code (3 letters), e.g. EZE
    #[arg(value_parser = parse_airport_code)]
    origin: String,

    /// Destination airport code (3 letters), e.g. PUJ
    #[arg(value_parser = parse_airport_code)]
    destination: String,

    /// First departure date to query (YYYY-MM-DD)
    #[arg(value_parser = parse_date)]
    departure_date: NaiveDate,

    /// First return date to query (YYYY-MM-DD)
    #[arg(value_parser = parse_date)]
    return_date: NaiveDate,

    /// Consecutive days to query in each direction
    #[arg(value_parser = clap::value_parser!(u32).range(1..=10))]
    days: u32,

    /// Maximum in-flight requests
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,

    /// Fare class to hunt for
    #[arg(long, default_value = faresweep_core::DEFAULT_FARE_CLASS)]
    fare_class: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 20)]
    timeout_secs: u64,

    /// Dev only: answer every search from this JSON file instead of the network
    #[arg(long, value_name = "PATH")]
    mock_response: Option<PathBuf>,
}

fn parse_airport_code(raw: &str) -> Result<String, String> {
    if raw.len() == 3 && raw.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(raw.to_ascii_uppercase())
    } else {
        Err(format!("airport code must be exactly 3 letters, got {raw:?}"))
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|err| format!("invalid date {raw:?}: {err}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let source: Arc<dyn ByteSource> = match &cli.mock_response {
        Some(path) => {
            eprintln!("dev mode: answering searches from {}", path.display());
            Arc::new(FileSource::new(path))
        }
        None => Arc::new(
            HttpSource::new(ClientConfig {
                timeout: Duration::from_secs(cli.timeout_secs),
                user_agent: None,
            })
            .context("initializing http transport")?,
        ),
    };

    let config = SearchConfig {
        origin: cli.origin,
        destination: cli.destination,
        departure_start: cli.departure_date,
        return_start: cli.return_date,
        day_count: cli.days,
        fare_class: cli.fare_class,
        max_concurrency: cli.concurrency,
    };

    println!(
        "Sweeping {} -> {}: departures from {}, returns from {}, {} day(s) each way",
        config.origin, config.destination, config.departure_start, config.return_start,
        config.day_count
    );

    let engine = SweepEngine::new(config, FareClient::new(source));
    let sweep = engine.run().await.context("running fare sweep")?;

    print!("{}", report::render(&sweep, &engine.config().fare_class));
    Ok(())
}
