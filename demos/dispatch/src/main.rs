//! dispatch: command-line demo for the rust_nearmatch matching service.
//!
//! Loads a driver snapshot from CSV and a service config from TOML, then
//! answers one rider request:
//!
//! ```text
//! cargo run -p dispatch -- --lat 30.0 --lon 31.2
//! cargo run -p dispatch -- --lat 30.0 --lon 31.2 --top 3
//! RUST_LOG=debug cargo run -p dispatch -- --lat 30.0 --lon 31.2 --radius-km 10
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use nm_core::{Clock, GeoPoint, ManualClock, SystemClock, Timestamp};
use nm_match::{CsvAgentFeed, Fleet, MatchConfig, MatchError, MatchQuery, MatchRequestHandler, MatchResult};

const DEFAULT_FLEET:  &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data/drivers.csv");
const DEFAULT_CONFIG: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data/nearmatch.toml");

#[derive(Parser, Debug)]
#[command(name = "dispatch")]
#[command(about = "Find the nearest available driver for a rider")]
struct Args {
    /// Driver snapshot (agent_id,latitude,longitude,timestamp_ms[,available][,label])
    #[arg(long, value_name = "CSV", default_value = DEFAULT_FLEET)]
    fleet: PathBuf,

    /// Service configuration
    #[arg(long, value_name = "TOML", default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    /// Rider latitude in degrees
    #[arg(long, allow_hyphen_values = true)]
    lat: f64,

    /// Rider longitude in degrees
    #[arg(long, allow_hyphen_values = true)]
    lon: f64,

    /// Number of ranked candidates to print
    #[arg(long, default_value_t = 1)]
    top: usize,

    /// List every driver within this radius instead of ranking
    #[arg(long, value_name = "KM")]
    radius_km: Option<f64>,

    /// Evaluate staleness at this time (Unix ms).  Defaults to the newest
    /// timestamp in the snapshot; pass `--live` to use the system clock.
    #[arg(long, value_name = "MS", conflicts_with = "live")]
    now_ms: Option<i64>,

    /// Use the system clock for staleness checks
    #[arg(long)]
    live: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let config = MatchConfig::load(&args.config)
        .with_context(|| format!("loading config {}", args.config.display()))?;

    let fleet = Arc::new(Fleet::new());
    let report = fleet
        .ingest(&CsvAgentFeed::from_path(&args.fleet))
        .with_context(|| format!("reading fleet {}", args.fleet.display()))?;
    for (id, err) in &report.rejected {
        eprintln!("skipped {id}: {err}");
    }

    let clock: Arc<dyn Clock> = if args.live {
        Arc::new(SystemClock)
    } else {
        let newest = fleet.read(|store, _| store.iter().map(|a| a.last_update).max());
        Arc::new(ManualClock::new(args.now_ms.map(Timestamp).or(newest).unwrap_or(Timestamp::ZERO)))
    };
    info!(agents = fleet.len(), now = %clock.now(), staleness = %config.staleness(), "fleet loaded");

    let handler = MatchRequestHandler::new(fleet, clock, &config);
    let rider = GeoPoint::try_new(args.lat, args.lon)?;
    let query = MatchQuery::new(rider, handler.default_filters().clone());

    if let Some(radius_km) = args.radius_km {
        let hits = handler.nearby(rider, radius_km, &query.filters)?;
        println!("{} driver(s) within {radius_km} km of {rider}:", hits.len());
        print_ranked(&handler, &hits);
    } else if args.top > 1 {
        let hits = handler.candidates(&query, args.top)?;
        if hits.is_empty() {
            println!("no available driver");
        }
        print_ranked(&handler, &hits);
    } else {
        match handler.match_query(&query) {
            Ok(m) => println!("The closest driver to you is {}", describe(&handler, &m)),
            Err(MatchError::NoAvailableAgent) => println!("no available driver"),
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

fn print_ranked(handler: &MatchRequestHandler, hits: &[MatchResult]) {
    for (rank, m) in hits.iter().enumerate() {
        println!("{:>3}. {}", rank + 1, describe(handler, m));
    }
}

fn describe(handler: &MatchRequestHandler, m: &MatchResult) -> String {
    let unit = handler.unit();
    let name = m.label.clone().unwrap_or_else(|| m.agent.to_string());
    format!("{name} ({:.2} {unit} away)", m.distance(unit))
}
