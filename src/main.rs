//! Tourism Demand Calendar — Binary Entrypoint
//! Reads the combined event CSV plus holiday and trend data, scores every
//! day of the requested range, and writes the calendar and pending-review
//! list as JSON.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;
use tracing::warn;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tourism_demand_calendar::{
    aggregate, normalize_rows, read_events_csv_file, DailyRecord, EventIndex, HolidaySet,
    MonthlyTrends, ScoringConfig,
};

#[derive(Parser)]
#[command(name = "tourism-demand-calendar")]
#[command(
    about = "Daily tourism demand scores from scraped event listings",
    long_about = None
)]
struct Cli {
    /// Combined event CSV (collector output)
    #[arg(long)]
    events: PathBuf,
    /// Public holiday CSV (syukujitsu.csv format)
    #[arg(long)]
    holidays: Option<PathBuf>,
    /// Monthly search-trend JSON
    #[arg(long)]
    trends: Option<PathBuf>,
    /// First calendar year (range starts January 1)
    #[arg(long, default_value_t = 2025)]
    start_year: i32,
    /// Last calendar year (range ends December 31)
    #[arg(long, default_value_t = 2026)]
    end_year: i32,
    /// Reiwa era year anchoring month/day-only date text
    #[arg(long)]
    era_year: Option<i32>,
    /// Scoring config TOML (default: SCORING_CONFIG_PATH, then built-in seed)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output path for the scored calendar
    #[arg(long, default_value = "calendar_data.json")]
    out: PathBuf,
    /// Output path for events needing manual date review
    #[arg(long, default_value = "pending_events.json")]
    pending_out: PathBuf,
}

/// Compact tracing to stderr; RUST_LOG overrides the default filter.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tourism_demand_calendar=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op elsewhere. This enables
    // SCORING_CONFIG_PATH from .env so config.rs can pick it up.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();

    let cfg = match &cli.config {
        Some(path) => ScoringConfig::load_from_file(path)
            .with_context(|| format!("loading scoring config {}", path.display()))?,
        None => ScoringConfig::load_or_seed(),
    };

    let holidays = match &cli.holidays {
        Some(path) => HolidaySet::load_from_file(path)
            .with_context(|| format!("loading holiday CSV {}", path.display()))?,
        None => {
            warn!("no holiday CSV given, holiday bonuses are off");
            HolidaySet::new()
        }
    };

    let trends = match &cli.trends {
        Some(path) => MonthlyTrends::load_from_file(path)
            .with_context(|| format!("loading trend JSON {}", path.display()))?,
        None => {
            warn!("no trend JSON given, trend boosts are off");
            MonthlyTrends::new()
        }
    };

    let rows = read_events_csv_file(&cli.events)?;
    let (records, excluded) = normalize_rows(rows, cli.era_year, &cfg);
    let (index, pending) = EventIndex::build(records);

    let start = NaiveDate::from_ymd_opt(cli.start_year, 1, 1)
        .with_context(|| format!("invalid start year {}", cli.start_year))?;
    let end = NaiveDate::from_ymd_opt(cli.end_year, 12, 31)
        .with_context(|| format!("invalid end year {}", cli.end_year))?;

    let days = aggregate(&index, &holidays, &trends, start, end, &cfg)?;
    let holiday_count = holidays.in_range(start, end).len();

    let calendar: BTreeMap<String, DailyRecord> =
        days.into_iter().map(|d| (d.date.to_string(), d)).collect();

    fs::write(&cli.out, serde_json::to_string_pretty(&calendar)?)
        .with_context(|| format!("writing {}", cli.out.display()))?;
    fs::write(&cli.pending_out, serde_json::to_string_pretty(&pending)?)
        .with_context(|| format!("writing {}", cli.pending_out.display()))?;

    println!(
        "Scored {} days ({} holidays) from {} events.",
        calendar.len(),
        holiday_count,
        index.len()
    );
    if excluded > 0 {
        println!("Dropped {excluded} events in excluded areas.");
    }
    println!("Calendar written to {}.", cli.out.display());
    println!(
        "{} events need date review, written to {}.",
        pending.len(),
        cli.pending_out.display()
    );

    Ok(())
}
