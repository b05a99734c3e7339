//! Export the processed dataset.
//!
//! - CSV: one row per country per day (clean cumulative counts + derived new cases),
//!   easy to consume in spreadsheets or downstream scripts
//! - JSON: one country's summary plus every derived array

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;

use crate::data::Dataset;
use crate::domain::{CountrySeries, Derived};
use crate::error::AppError;
use crate::metrics::{active_each_day, new_cases_each_day, r_values_each_day, weekly_averages};
use crate::report::CountrySummary;

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    country: &'a str,
    date: NaiveDate,
    confirmed: u64,
    deaths: u64,
    recovered: u64,
    active: i64,
    new_cases: Option<u64>,
    lat: Option<f64>,
    long: Option<f64>,
}

/// Write every country's series as CSV.
pub fn write_dataset_csv<W: Write>(writer: W, dataset: &Dataset) -> Result<(), AppError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for series in dataset.iter() {
        let new_cases = new_cases_each_day(series);
        for (i, obs) in series.observations().iter().enumerate() {
            let new = i.checked_sub(new_cases.offset).and_then(|k| new_cases.values.get(k)).copied();
            wtr.serialize(CsvRow {
                country: series.country(),
                date: obs.date,
                confirmed: obs.confirmed,
                deaths: obs.deaths,
                recovered: obs.recovered,
                active: obs.active(),
                new_cases: new,
                lat: obs.lat,
                long: obs.long,
            })
            .map_err(|e| AppError::new(4, format!("Failed to write export CSV row: {e}")))?;
        }
    }
    wtr.flush()
        .map_err(|e| AppError::new(4, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

pub fn export_dataset_csv(path: &Path, dataset: &Dataset) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_dataset_csv(file, dataset)?;
    tracing::info!(path = %path.display(), countries = dataset.len(), "wrote dataset CSV");
    Ok(())
}

/// JSON document for one country.
#[derive(Debug, Serialize)]
pub struct CountryExport<'a> {
    pub summary: &'a CountrySummary,
    pub dates: Vec<NaiveDate>,
    pub confirmed: Vec<u64>,
    pub deaths: Vec<u64>,
    pub recovered: Vec<u64>,
    pub active: Derived<i64>,
    pub new_cases: Derived<u64>,
    pub weekly_averages: Derived<f64>,
    pub r_values: Derived<f64>,
}

impl<'a> CountryExport<'a> {
    pub fn new(series: &CountrySeries, summary: &'a CountrySummary) -> Self {
        let obs = series.observations();
        Self {
            summary,
            dates: obs.iter().map(|o| o.date).collect(),
            confirmed: obs.iter().map(|o| o.confirmed).collect(),
            deaths: obs.iter().map(|o| o.deaths).collect(),
            recovered: obs.iter().map(|o| o.recovered).collect(),
            active: active_each_day(series),
            new_cases: new_cases_each_day(series),
            weekly_averages: weekly_averages(series, summary.window),
            r_values: r_values_each_day(series, summary.window),
        }
    }
}

pub fn export_country_json(path: &Path, series: &CountrySeries, summary: &CountrySummary) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, &CountryExport::new(series, summary))
        .map_err(|e| AppError::new(4, format!("Failed to write export JSON: {e}")))?;
    tracing::info!(path = %path.display(), country = series.country(), "wrote country JSON");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Field;
    use crate::io::ingest::RawTable;
    use crate::report::summarize;

    fn dataset() -> Dataset {
        let table = RawTable::from_csv_str(
            "Country/Region,Lat,Long,3/1/20,3/2/20,3/3/20\n\"Korea, South\",36,128,1,4,9\nIsrael,31,35,0,2,2\n",
        )
        .unwrap();
        Dataset::from_tables(&[(Field::Confirmed, table)], 20).unwrap()
    }

    #[test]
    fn csv_has_one_row_per_country_day() {
        let mut buf = Vec::new();
        write_dataset_csv(&mut buf, &dataset()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "country,date,confirmed,deaths,recovered,active,new_cases,lat,long");
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[1], "Israel,2020-03-01,0,0,0,0,,31.0,35.0");
        assert_eq!(lines[6], "\"Korea, South\",2020-03-03,9,0,0,9,5,36.0,128.0");
    }

    #[test]
    fn json_export_aligns_derived_arrays() {
        let ds = dataset();
        let series = ds.country("Israel").unwrap();
        let summary = summarize(series, ds.quality("Israel"), 7).unwrap();
        let value = serde_json::to_value(CountryExport::new(series, &summary)).unwrap();
        assert_eq!(value["new_cases"]["offset"], 1);
        assert_eq!(value["new_cases"]["values"], serde_json::json!([2, 0]));
        assert_eq!(value["summary"]["country"], "Israel");
        assert_eq!(value["dates"][0], "2020-03-01");
    }
}
