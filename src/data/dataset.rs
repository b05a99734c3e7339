//! The processed, per-country dataset.
//!
//! `Dataset` is built once per run and owns every `CountrySeries`. Building it is the
//! whole normalization pipeline:
//!
//! 1. typed rows per counter (from CSV tables or JSON day records)
//! 2. duplicate rows merged, provinces aggregated (`normalize`)
//! 3. confirmed/deaths/recovered joined by date, per country
//! 4. monotonic counters enforced
//!
//! Step 3 and 4 are independent per country and run on the rayon pool; results land
//! in a `BTreeMap`, so the order of countries never depends on scheduling.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rayon::prelude::*;

use crate::domain::{CountrySeries, DailyObservation, Field};
use crate::error::SeriesError;
use crate::io::ingest::{FieldRows, RawTable, RowIssue, SourceRow, parse_table};
use crate::io::records::{DayRecord, rows_from_records};
use crate::normalize::{ClampReport, aggregate_provinces, enforce_series};

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    series: BTreeMap<String, CountrySeries>,
    quality: BTreeMap<String, ClampReport>,
    issues: Vec<RowIssue>,
}

/// Result of assembling one country.
struct Assembled {
    country: String,
    series: Option<CountrySeries>,
    report: ClampReport,
    issues: Vec<RowIssue>,
}

impl Dataset {
    /// Build from wide CSV tables. Several tables may carry the same counter; their
    /// rows are merged.
    pub fn from_tables(tables: &[(Field, RawTable)], century: i32) -> Result<Self, SeriesError> {
        let mut rows = FieldRows::default();
        let mut issues = Vec::new();
        for (field, table) in tables {
            let parsed = parse_table(table, century)?;
            tracing::debug!(
                field = field.display_name(),
                rows = parsed.rows.len(),
                dates = parsed.schema.date_count(),
                skipped = parsed.issues.len(),
                "parsed table"
            );
            rows.get_mut(*field).extend(parsed.rows);
            issues.extend(parsed.issues);
        }
        Self::from_field_rows(&rows, issues)
    }

    /// Build from JSON day records.
    pub fn from_records(records: &[DayRecord]) -> Result<Self, SeriesError> {
        let (rows, issues) = rows_from_records(records);
        Self::from_field_rows(&rows, issues)
    }

    /// Build from typed rows. Countries are those present in the confirmed rows.
    pub fn from_field_rows(rows: &FieldRows, mut issues: Vec<RowIssue>) -> Result<Self, SeriesError> {
        let confirmed = aggregate_provinces(rows.get(Field::Confirmed))?;
        if confirmed.is_empty() {
            return Err(SeriesError::Schema("No confirmed-case rows to build a dataset from".to_string()));
        }
        let deaths = aggregate_provinces(rows.get(Field::Deaths))?;
        let recovered = aggregate_provinces(rows.get(Field::Recovered))?;

        let countries: Vec<(&String, &SourceRow)> = confirmed.iter().collect();
        let assembled: Vec<Assembled> = countries
            .par_iter()
            .map(|(country, row)| assemble_country(country, row, deaths.get(*country), recovered.get(*country)))
            .collect();

        let mut dataset = Dataset::default();
        for a in assembled {
            issues.extend(a.issues);
            match a.series {
                Some(series) => {
                    dataset.quality.insert(a.country.clone(), a.report);
                    dataset.series.insert(a.country, series);
                }
                None => issues.push(RowIssue {
                    line: 0,
                    country: Some(a.country),
                    message: "no usable observations".to_string(),
                }),
            }
        }
        dataset.issues = issues;

        tracing::info!(
            countries = dataset.series.len(),
            issues = dataset.issues.len(),
            clamped = dataset.quality.values().map(ClampReport::clamped).sum::<usize>(),
            "dataset ready"
        );
        Ok(dataset)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Country names in sorted order.
    pub fn countries(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CountrySeries> {
        self.series.values()
    }

    /// Look up a country: exact name first, then ASCII case-insensitive.
    pub fn country(&self, name: &str) -> Result<&CountrySeries, SeriesError> {
        let name = name.trim();
        if let Some(series) = self.series.get(name) {
            return Ok(series);
        }
        self.series
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, series)| series)
            .ok_or_else(|| SeriesError::UnknownCountry(name.to_string()))
    }

    /// Clamp counts recorded while building `country`'s series.
    pub fn quality(&self, country: &str) -> Option<&ClampReport> {
        self.quality.get(country)
    }

    /// Rows and cells skipped during ingest and assembly.
    pub fn issues(&self) -> &[RowIssue] {
        &self.issues
    }
}

fn assemble_country(
    country: &str,
    confirmed: &SourceRow,
    deaths: Option<&SourceRow>,
    recovered: Option<&SourceRow>,
) -> Assembled {
    let (confirmed_counts, mut issues) = confirmed.counts(Field::Confirmed);
    let mut extract = |row: Option<&SourceRow>, field: Field| -> Option<HashMap<NaiveDate, u64>> {
        let row = row?;
        let (counts, row_issues) = row.counts(field);
        issues.extend(row_issues);
        Some(counts.into_iter().collect())
    };
    let deaths = extract(deaths, Field::Deaths);
    let recovered = extract(recovered, Field::Recovered);

    if deaths.is_none() || recovered.is_none() {
        tracing::debug!(country, "missing deaths or recovered rows, counting them as 0");
    }

    // A date is kept only if every available counter has a usable value for it.
    let lookup = |map: &Option<HashMap<NaiveDate, u64>>, date: &NaiveDate| match map {
        Some(m) => m.get(date).copied(),
        None => Some(0),
    };

    let mut observations = Vec::with_capacity(confirmed_counts.len());
    for (date, confirmed_count) in confirmed_counts {
        let (Some(d), Some(r)) = (lookup(&deaths, &date), lookup(&recovered, &date)) else {
            issues.push(RowIssue {
                line: confirmed.line,
                country: Some(country.to_string()),
                message: format!("{date}: dropped, deaths or recovered missing"),
            });
            continue;
        };
        observations.push(DailyObservation {
            country: country.to_string(),
            province: confirmed.province().map(str::to_string),
            date,
            confirmed: confirmed_count,
            deaths: d,
            recovered: r,
            lat: confirmed.lat(),
            long: confirmed.long(),
        });
    }

    if observations.is_empty() {
        return Assembled {
            country: country.to_string(),
            series: None,
            report: ClampReport::default(),
            issues,
        };
    }

    let (series, report) = enforce_series(country, observations);
    Assembled {
        country: country.to_string(),
        series: Some(series),
        report,
        issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIRMED: &str = "Province/State,Country/Region,Lat,Long,3/1/20,3/2/20,3/3/20,3/4/20\n\
        ,Israel,31,35,10,10,8,15\n\
        Alberta,Canada,50,-110,1,2,3,4\n\
        Ontario,Canada,40,-80,2,2,2,2\n";
    const DEATHS: &str = "Province/State,Country/Region,Lat,Long,3/1/20,3/2/20,3/3/20,3/4/20\n\
        ,Israel,31,35,0,1,1,\n\
        Alberta,Canada,50,-110,0,0,0,0\n\
        Ontario,Canada,40,-80,0,0,1,1\n";

    fn table(text: &str) -> RawTable {
        RawTable::from_csv_str(text).unwrap()
    }

    fn dataset() -> Dataset {
        Dataset::from_tables(&[(Field::Confirmed, table(CONFIRMED)), (Field::Deaths, table(DEATHS))], 20).unwrap()
    }

    #[test]
    fn builds_clamped_country_series() {
        let ds = dataset();
        assert_eq!(ds.countries().collect::<Vec<_>>(), vec!["Canada", "Israel"]);

        let israel = ds.country("Israel").unwrap();
        // 3/4 has no deaths value, so the day is a gap rather than a guess.
        assert_eq!(israel.field_values(Field::Confirmed), vec![10, 10, 10]);
        assert_eq!(israel.field_values(Field::Deaths), vec![0, 1, 1]);
        assert_eq!(ds.quality("Israel").unwrap().confirmed, 1);
        assert!(ds.issues().iter().any(|i| i.country.as_deref() == Some("Israel")));
    }

    #[test]
    fn provinces_are_summed_and_recovered_defaults_to_zero() {
        let ds = dataset();
        let canada = ds.country("Canada").unwrap();
        assert_eq!(canada.field_values(Field::Confirmed), vec![3, 4, 5, 6]);
        assert_eq!(canada.field_values(Field::Deaths), vec![0, 0, 1, 1]);
        assert_eq!(canada.field_values(Field::Recovered), vec![0, 0, 0, 0]);
    }

    #[test]
    fn lookup_falls_back_to_case_insensitive() {
        let ds = dataset();
        assert_eq!(ds.country("canada").unwrap().country(), "Canada");
        assert_eq!(
            ds.country("Atlantis"),
            Err(SeriesError::UnknownCountry("Atlantis".to_string()))
        );
    }

    #[test]
    fn multiple_tables_for_one_counter_are_merged() {
        let extra = "Country/Region,3/4/20,3/5/20\nIsrael,5,20\n";
        let ds = Dataset::from_tables(
            &[(Field::Confirmed, table(CONFIRMED)), (Field::Confirmed, table(extra))],
            20,
        )
        .unwrap();
        let israel = ds.country("Israel").unwrap();
        // 3/4: 15 + 5; 3/5 only in the second table.
        assert_eq!(israel.field_values(Field::Confirmed), vec![10, 10, 10, 20, 20]);
    }

    #[test]
    fn table_without_confirmed_rows_is_a_schema_error() {
        let err = Dataset::from_field_rows(&FieldRows::default(), Vec::new()).unwrap_err();
        assert!(matches!(err, SeriesError::Schema(_)));
    }
}
