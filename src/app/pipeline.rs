//! Shared "load" logic used by every command.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! source (download / CSV / JSON) -> typed rows -> merged + aggregated -> clean series
//!
//! The command handlers can then focus on presentation.

use std::path::PathBuf;

use crate::data::{Dataset, JhuClient};
use crate::domain::{DataSource, Field, RunConfig};
use crate::error::AppError;
use crate::io::ingest::{RawTable, load_table};
use crate::io::records::load_records;

/// Build the processed dataset for a run.
pub fn load_dataset(config: &RunConfig) -> Result<Dataset, AppError> {
    let dataset = match &config.source {
        DataSource::Remote { base_url } => {
            let client = JhuClient::new(base_url.clone());
            let tables = client.fetch_all()?;
            Dataset::from_tables(&tables, config.century)?
        }
        DataSource::Tables {
            confirmed,
            deaths,
            recovered,
        } => {
            let tables = read_tables(&[
                (Field::Confirmed, confirmed),
                (Field::Deaths, deaths),
                (Field::Recovered, recovered),
            ])?;
            Dataset::from_tables(&tables, config.century)?
        }
        DataSource::Records { path } => {
            let records = load_records(path)?;
            tracing::info!(records = records.len(), path = %path.display(), "loaded day records");
            Dataset::from_records(&records)?
        }
    };

    if dataset.is_empty() {
        return Err(AppError::new(3, "No country has usable data."));
    }
    Ok(dataset)
}

fn read_tables(groups: &[(Field, &Vec<PathBuf>)]) -> Result<Vec<(Field, RawTable)>, AppError> {
    let mut tables = Vec::new();
    for (field, paths) in groups {
        for path in paths.iter() {
            tables.push((*field, load_table(path)?));
        }
    }
    Ok(tables)
}
