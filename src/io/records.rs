//! JSON "day record" ingest.
//!
//! Some providers deliver one object per (country, province, day) instead of a wide
//! time-series table:
//!
//! ```json
//! [{"Country": "Israel", "Province": "", "Lat": "31", "Lon": "35",
//!   "Confirmed": 10, "Deaths": 0, "Recovered": 1, "Date": "2020-03-01T00:00:00Z"}]
//! ```
//!
//! Records are converted to the same `SourceRow`s the CSV path produces, so the rest
//! of the pipeline does not care which format the data arrived in.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use chrono::{DateTime, NaiveDate};
use serde::Deserialize;

use crate::domain::{Cell, Field};
use crate::error::{AppError, SeriesError};
use crate::io::ingest::{FieldRows, IdentityCell, Role, RowIssue, SourceRow};

/// One raw day record.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DayRecord {
    pub country: String,
    #[serde(default)]
    pub province: String,
    #[serde(default)]
    pub lat: Option<serde_json::Value>,
    #[serde(default)]
    pub lon: Option<serde_json::Value>,
    #[serde(default)]
    pub confirmed: Option<serde_json::Value>,
    #[serde(default)]
    pub deaths: Option<serde_json::Value>,
    #[serde(default)]
    pub recovered: Option<serde_json::Value>,
    pub date: String,
}

/// Parse a JSON array of day records.
pub fn parse_records(json: &str) -> Result<Vec<DayRecord>, SeriesError> {
    serde_json::from_str(json).map_err(|e| SeriesError::Schema(format!("Invalid day-record JSON: {e}")))
}

pub fn load_records(path: &Path) -> Result<Vec<DayRecord>, AppError> {
    let text = fs::read_to_string(path)
        .map_err(|e| AppError::new(2, format!("Failed to read records '{}': {e}", path.display())))?;
    Ok(parse_records(&text)?)
}

/// Convert day records into per-field rows (one row per record and field).
///
/// When a country reports a record with an empty province, that record is the
/// national total and the same country's province records are dropped; otherwise
/// the province records are kept and aggregated later.
pub fn rows_from_records(records: &[DayRecord]) -> (FieldRows, Vec<RowIssue>) {
    let with_total: HashSet<&str> = records
        .iter()
        .filter(|r| r.province.trim().is_empty())
        .map(|r| r.country.trim())
        .collect();

    let mut rows = FieldRows::default();
    let mut issues = Vec::new();

    for (idx, record) in records.iter().enumerate() {
        let country = record.country.trim();
        let province = record.province.trim();
        if country.is_empty() {
            issues.push(RowIssue {
                line: idx + 1,
                country: None,
                message: "record without a country".to_string(),
            });
            continue;
        }
        if !province.is_empty() && with_total.contains(country) {
            continue;
        }

        let date = match parse_record_date(&record.date) {
            Some(d) => d,
            None => {
                issues.push(RowIssue {
                    line: idx + 1,
                    country: Some(country.to_string()),
                    message: format!("invalid record date '{}'", record.date),
                });
                continue;
            }
        };

        let identity = vec![
            IdentityCell {
                name: "Country".to_string(),
                role: Role::Country,
                value: Cell::Str(country.to_string()),
            },
            IdentityCell {
                name: "Province".to_string(),
                role: Role::Province,
                value: if province.is_empty() { Cell::Null } else { Cell::Str(province.to_string()) },
            },
            IdentityCell {
                name: "Lat".to_string(),
                role: Role::Lat,
                value: coordinate(record.lat.as_ref()),
            },
            IdentityCell {
                name: "Lon".to_string(),
                role: Role::Long,
                value: coordinate(record.lon.as_ref()),
            },
        ];

        for field in Field::ALL {
            let value = match field {
                Field::Confirmed => record.confirmed.as_ref(),
                Field::Deaths => record.deaths.as_ref(),
                Field::Recovered => record.recovered.as_ref(),
            };
            rows.get_mut(field).push(SourceRow {
                line: idx + 1,
                identity: identity.clone(),
                series: vec![(date, value_cell(value))],
            });
        }
    }

    (rows, issues)
}

/// Accepts RFC 3339 timestamps and plain `YYYY-MM-DD`.
fn parse_record_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Type a JSON value the way a CSV token would be typed.
///
/// Providers disagree on whether numbers are JSON numbers or strings.
fn value_cell(value: Option<&serde_json::Value>) -> Cell {
    match value {
        None | Some(serde_json::Value::Null) => Cell::Null,
        Some(serde_json::Value::Number(n)) => match n.as_i64() {
            Some(v) => Cell::Int(v),
            None => n.as_f64().filter(|v| v.is_finite()).map_or(Cell::Null, Cell::Float),
        },
        Some(serde_json::Value::String(s)) => Cell::infer(s),
        Some(other) => Cell::Str(other.to_string()),
    }
}

fn coordinate(value: Option<&serde_json::Value>) -> Cell {
    value_cell(value).into_float()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {"Country": "Israel", "Province": "", "Lat": "31.05", "Lon": 34.85,
         "Confirmed": 10, "Deaths": 0, "Recovered": 1, "Date": "2020-03-01T00:00:00Z"},
        {"Country": "Israel", "Province": "Tel Aviv", "Lat": "32.1", "Lon": "34.8",
         "Confirmed": 4, "Deaths": 0, "Recovered": 0, "Date": "2020-03-01T00:00:00Z"},
        {"Country": "Canada", "Province": "Ontario", "Confirmed": 3, "Deaths": 0,
         "Recovered": null, "Date": "2020-03-01"},
        {"Country": "Canada", "Province": "Quebec", "Confirmed": 2, "Date": "not a date"}
    ]"#;

    #[test]
    fn national_total_wins_over_provinces() {
        let records = parse_records(SAMPLE).unwrap();
        let (rows, issues) = rows_from_records(&records);

        assert_eq!(issues.len(), 1);
        let israel: Vec<&SourceRow> = rows.confirmed.iter().filter(|r| r.country() == Some("Israel")).collect();
        assert_eq!(israel.len(), 1);
        assert_eq!(israel[0].province(), None);
        assert_eq!(israel[0].lat(), Some(31.05));
        assert_eq!(israel[0].long(), Some(34.85));
        assert_eq!(israel[0].series[0].1, Cell::Int(10));
    }

    #[test]
    fn missing_counts_become_null_cells() {
        let records = parse_records(SAMPLE).unwrap();
        let (rows, _) = rows_from_records(&records);
        let ontario = rows.recovered.iter().find(|r| r.province() == Some("Ontario")).unwrap();
        assert_eq!(ontario.series[0].1, Cell::Null);
        assert_eq!(ontario.series[0].0, NaiveDate::from_ymd_opt(2020, 3, 1).unwrap());
    }

    #[test]
    fn string_and_float_counts_are_typed_like_csv_tokens() {
        let json = r#"[
            {"Country": "Chile", "Confirmed": "10", "Deaths": 2.0, "Recovered": "n/a", "Date": "2020-03-01"}
        ]"#;
        let records = parse_records(json).unwrap();
        let (rows, issues) = rows_from_records(&records);

        assert!(issues.is_empty());
        assert_eq!(rows.confirmed[0].series[0].1, Cell::Int(10));
        assert_eq!(rows.deaths[0].series[0].1, Cell::Float(2.0));
        assert_eq!(rows.recovered[0].series[0].1, Cell::Str("n/a".to_string()));
    }

    #[test]
    fn malformed_json_is_a_schema_error() {
        assert!(matches!(parse_records("{\"Country\": 1}"), Err(SeriesError::Schema(_))));
    }
}
