//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - resolves the run configuration (flags, environment, defaults)
//! - builds the processed dataset
//! - prints reports/plots or writes exports

use clap::Parser;

use crate::cli::{CheckArgs, Command, ExportArgs, ReportArgs, SourceArgs};
use crate::data::Dataset;
use crate::domain::{DataSource, RunConfig};
use crate::error::AppError;
use crate::io::ingest::current_century;
use crate::io::state::{Freshness, SeenState};

pub mod pipeline;

/// How many skipped rows `--show-issues` prints.
const ISSUE_LIMIT: usize = 50;

/// Entry point for the `covid` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    // We want `covid -c Israel` to behave like `covid report -c Israel`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Report(args) => handle_report(args),
        Command::Countries(source) => handle_countries(source),
        Command::Export(args) => handle_export(args),
        Command::Check(args) => handle_check(args),
    }
}

fn handle_report(args: ReportArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args.source);
    let dataset = load(&config, &args.source)?;

    let series = dataset.country(&args.country)?;
    let summary = crate::report::summarize(series, dataset.quality(series.country()), config.window)?;
    println!("{}", crate::report::format_country_report(&summary));

    if args.plot {
        println!(
            "{}",
            crate::plot::render_country_plots(series, config.window, args.days, args.width, args.height)
        );
    }
    Ok(())
}

fn handle_countries(source: SourceArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&source);
    let dataset = load(&config, &source)?;
    print!("{}", crate::report::format_countries(&dataset));
    Ok(())
}

fn handle_export(args: ExportArgs) -> Result<(), AppError> {
    if args.csv.is_none() && args.json.is_none() {
        return Err(AppError::new(2, "Nothing to export: pass --csv and/or --json."));
    }
    let config = run_config_from_args(&args.source);
    let dataset = load(&config, &args.source)?;

    if let Some(path) = &args.csv {
        crate::io::export::export_dataset_csv(path, &dataset)?;
    }
    if let (Some(path), Some(country)) = (&args.json, &args.country) {
        let series = dataset.country(country)?;
        let summary = crate::report::summarize(series, dataset.quality(series.country()), config.window)?;
        crate::io::export::export_country_json(path, series, &summary)?;
    }
    Ok(())
}

fn handle_check(args: CheckArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args.source);
    let dataset = load(&config, &args.source)?;

    let series = dataset.country(&args.country)?;
    let latest = series
        .last()
        .map(|o| o.date)
        .ok_or_else(|| AppError::new(3, format!("No data for '{}'.", series.country())))?;

    let mut state = SeenState::load(&args.state)?;
    match state.check_and_record(series.country(), latest) {
        Freshness::New { previous, latest } => {
            match previous {
                Some(prev) => println!("{}: new data for {latest} (previous {prev})", series.country()),
                None => println!("{}: new data for {latest}", series.country()),
            }
            state.save(&args.state)?;
        }
        Freshness::Unchanged { latest } => {
            println!("{}: no new data (latest {latest})", series.country());
        }
    }
    Ok(())
}

fn load(config: &RunConfig, source: &SourceArgs) -> Result<Dataset, AppError> {
    let dataset = pipeline::load_dataset(config)?;
    if source.show_issues && !dataset.issues().is_empty() {
        eprintln!("Skipped during ingest ({}):", dataset.issues().len());
        eprint!("{}", crate::report::format_issues(dataset.issues(), ISSUE_LIMIT));
    }
    Ok(dataset)
}

pub fn run_config_from_args(args: &SourceArgs) -> RunConfig {
    let source = if !(args.confirmed.is_empty() && args.deaths.is_empty() && args.recovered.is_empty()) {
        DataSource::Tables {
            confirmed: args.confirmed.clone(),
            deaths: args.deaths.clone(),
            recovered: args.recovered.clone(),
        }
    } else if let Some(path) = &args.records {
        DataSource::Records { path: path.clone() }
    } else {
        DataSource::Remote {
            base_url: args.data_url.clone(),
        }
    };

    RunConfig {
        source,
        window: usize::from(args.window),
        century: args.century.unwrap_or_else(current_century),
    }
}

/// Rewrite argv so `covid -c X` means `covid report -c X`.
///
/// Rules:
/// - `covid --help/--version/-h` -> unchanged (show top-level help/version)
/// - `covid <subcommand> ...`   -> unchanged
/// - `covid -c X ...`           -> `covid report -c X ...`
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "report" | "countries" | "export" | "check");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "report flags".
    if arg1.starts_with('-') {
        argv.insert(1, "report".to_string());
    }
    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn country_flag_defaults_to_report() {
        assert_eq!(rewrite_args(args(&["covid", "-c", "Israel"])), args(&["covid", "report", "-c", "Israel"]));
        assert_eq!(rewrite_args(args(&["covid", "check", "-c", "Israel"])), args(&["covid", "check", "-c", "Israel"]));
        assert_eq!(rewrite_args(args(&["covid", "--help"])), args(&["covid", "--help"]));
        assert_eq!(rewrite_args(args(&["covid"])), args(&["covid"]));
    }

    fn source(list: &[&str]) -> SourceArgs {
        let cli = crate::cli::Cli::try_parse_from(list).unwrap();
        match cli.command {
            Command::Countries(source) => source,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn local_tables_win_over_records_and_download() {
        let config = run_config_from_args(&source(&["covid", "countries", "--deaths", "d.csv", "--century", "20"]));
        assert_eq!(
            config.source,
            DataSource::Tables {
                confirmed: Vec::new(),
                deaths: vec![PathBuf::from("d.csv")],
                recovered: Vec::new(),
            }
        );
        assert_eq!(config.century, 20);

        let config = run_config_from_args(&source(&["covid", "countries", "--records", "r.json"]));
        assert_eq!(
            config.source,
            DataSource::Records {
                path: PathBuf::from("r.json")
            }
        );
    }
}
