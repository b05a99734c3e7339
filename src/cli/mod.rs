//! Command-line parsing for the COVID statistics tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the normalization/metrics code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::data::jhu::DEFAULT_BASE_URL;
use crate::metrics::DEFAULT_WINDOW;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "covid", version, about = "Daily COVID-19 statistics: clean series, new cases and R values")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print one country's summary (totals, day-over-day changes, R) and optional plots.
    Report(ReportArgs),
    /// List every country in the processed dataset.
    Countries(SourceArgs),
    /// Export the processed dataset (CSV) or one country's metrics (JSON).
    Export(ExportArgs),
    /// Report whether a country has data newer than the last check, then record it.
    Check(CheckArgs),
}

/// Where the data comes from (shared by every command).
///
/// Local tables win over `--records`; with neither, the JHU tables are downloaded.
#[derive(Debug, Args, Clone)]
pub struct SourceArgs {
    /// Confirmed-cases CSV (repeatable; rows of all files are merged).
    #[arg(long, value_name = "CSV")]
    pub confirmed: Vec<PathBuf>,

    /// Deaths CSV (repeatable).
    #[arg(long, value_name = "CSV")]
    pub deaths: Vec<PathBuf>,

    /// Recovered CSV (repeatable).
    #[arg(long, value_name = "CSV")]
    pub recovered: Vec<PathBuf>,

    /// JSON file of per-day records (Country, Province, Lat, Lon, Confirmed, Deaths, Recovered, Date).
    #[arg(long, value_name = "JSON")]
    pub records: Option<PathBuf>,

    /// Base URL of the JHU time-series CSVs.
    #[arg(long, env = "COVID_DATA_URL", default_value = DEFAULT_BASE_URL)]
    pub data_url: String,

    /// Rolling-average window (days) for weekly averages and R values.
    #[arg(short = 'w', long, env = "COVID_WINDOW", default_value_t = DEFAULT_WINDOW as u16, value_parser = clap::value_parser!(u16).range(1..))]
    pub window: u16,

    /// Century for `M/D/YY` date headers (default: the current one).
    #[arg(long)]
    pub century: Option<i32>,

    /// Print rows and cells skipped during ingest.
    #[arg(long)]
    pub show_issues: bool,
}

#[derive(Debug, Args, Clone)]
pub struct ReportArgs {
    /// Country name (exact or case-insensitive).
    #[arg(short = 'c', long)]
    pub country: String,

    /// Render ASCII plots of new cases and R values.
    #[arg(long)]
    pub plot: bool,

    /// Number of trailing days to plot.
    #[arg(long, default_value_t = 60)]
    pub days: usize,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 15)]
    pub height: usize,

    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    /// Write the whole processed dataset to CSV.
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,

    /// Write one country's summary and derived arrays to JSON (requires --country).
    #[arg(long, value_name = "PATH", requires = "country")]
    pub json: Option<PathBuf>,

    /// Country for the JSON export.
    #[arg(short = 'c', long)]
    pub country: Option<String>,

    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(Debug, Args, Clone)]
pub struct CheckArgs {
    /// Country name (exact or case-insensitive).
    #[arg(short = 'c', long)]
    pub country: String,

    /// State file holding the last seen date per country.
    #[arg(long, value_name = "JSON", default_value = "covid-state.json")]
    pub state: PathBuf,

    #[command(flatten)]
    pub source: SourceArgs,
}
