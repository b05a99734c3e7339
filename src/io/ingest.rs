//! CSV ingest: raw string tables into typed rows.
//!
//! This module is responsible for turning a time-series table (identity columns on
//! the left, one `M/D/YY` column per day) into `SourceRow`s whose cells are typed.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Deterministic behavior** (the century used for 2-digit years is an input)
//! - **Separation of concerns**: no merging or metrics here

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{Datelike, Local, NaiveDate};
use serde::Serialize;

use crate::domain::{Cell, Field};
use crate::error::{AppError, SeriesError};

/// A table exactly as delivered by the source: headers + rows of strings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Read a CSV table (first record = headers).
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, SeriesError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| SeriesError::Schema(format!("Failed to read CSV headers: {e}")))?
            .iter()
            .map(normalize_header_name)
            .collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result.map_err(|e| SeriesError::Schema(format!("CSV parse error: {e}")))?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self { headers, rows })
    }

    pub fn from_csv_str(text: &str) -> Result<Self, SeriesError> {
        Self::from_csv_reader(text.as_bytes())
    }
}

/// Open and read a CSV table from disk.
pub fn load_table(path: &Path) -> Result<RawTable, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    let table = RawTable::from_csv_reader(file)?;
    tracing::debug!(path = %path.display(), rows = table.rows.len(), "loaded table");
    Ok(table)
}

/// What an identity (non-date) column means to the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Role {
    Country,
    Province,
    Lat,
    Long,
    Other,
}

impl Role {
    fn from_header(name: &str) -> Role {
        match name.to_ascii_lowercase().as_str() {
            "country/region" | "country_region" | "country" => Role::Country,
            "province/state" | "province_state" | "province" => Role::Province,
            "lat" | "latitude" => Role::Lat,
            "long" | "long_" | "lon" | "longitude" => Role::Long,
            _ => Role::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Identity { name: String, role: Role },
    Date(NaiveDate),
}

/// Resolved header layout of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    /// Classify headers into identity and date columns.
    ///
    /// A header that is not an `M/D/YY` date is an identity column; that is never an
    /// error. The table must still carry a country column and at least one date.
    pub fn from_headers(headers: &[String], century: i32) -> Result<Self, SeriesError> {
        let columns: Vec<Column> = headers
            .iter()
            .map(|h| match parse_date_header(h, century) {
                Some(date) => Column::Date(date),
                None => Column::Identity {
                    name: h.clone(),
                    role: Role::from_header(h),
                },
            })
            .collect();

        let schema = Self { columns };
        if !schema.has_role(Role::Country) {
            return Err(SeriesError::Schema(
                "Missing required identity column: `Country/Region`".to_string(),
            ));
        }
        if schema.date_count() == 0 {
            return Err(SeriesError::Schema("Table has no `M/D/YY` date columns".to_string()));
        }
        Ok(schema)
    }

    pub fn date_count(&self) -> usize {
        self.columns.iter().filter(|c| matches!(c, Column::Date(_))).count()
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.columns
            .iter()
            .any(|c| matches!(c, Column::Identity { role: r, .. } if *r == role))
    }
}

/// One typed identity cell of a row.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityCell {
    pub name: String,
    pub role: Role,
    pub value: Cell,
}

/// A typed row: identity cells plus one cell per date.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRow {
    /// 1-based source line (0 for rows that were not read from a file).
    pub line: usize,
    pub identity: Vec<IdentityCell>,
    pub series: Vec<(NaiveDate, Cell)>,
}

impl SourceRow {
    fn role_value(&self, role: Role) -> Option<&Cell> {
        self.identity.iter().find(|c| c.role == role).map(|c| &c.value)
    }

    pub fn country(&self) -> Option<&str> {
        self.role_value(Role::Country).and_then(Cell::as_str)
    }

    pub fn province(&self) -> Option<&str> {
        self.role_value(Role::Province).and_then(Cell::as_str)
    }

    pub fn lat(&self) -> Option<f64> {
        self.role_value(Role::Lat).and_then(Cell::as_f64)
    }

    pub fn long(&self) -> Option<f64> {
        self.role_value(Role::Long).and_then(Cell::as_f64)
    }

    /// Extract `(date, count)` pairs. Cells that are not valid counts are gaps: they
    /// are reported, never filled in.
    pub fn counts(&self, field: Field) -> (Vec<(NaiveDate, u64)>, Vec<RowIssue>) {
        let mut counts = Vec::with_capacity(self.series.len());
        let mut issues = Vec::new();
        for (date, cell) in &self.series {
            match cell.as_count() {
                Some(v) => counts.push((*date, v)),
                None => issues.push(RowIssue {
                    line: self.line,
                    country: self.country().map(str::to_string),
                    message: format!("{date}: no usable {} count ({cell:?})", field.display_name()),
                }),
            }
        }
        (counts, issues)
    }
}

/// A row-level problem encountered during ingest or assembly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowIssue {
    pub line: usize,
    pub country: Option<String>,
    pub message: String,
}

/// Parse output: schema + typed rows + skipped rows.
#[derive(Debug, Clone)]
pub struct ParsedTable {
    pub schema: Schema,
    pub rows: Vec<SourceRow>,
    pub issues: Vec<RowIssue>,
}

/// Typed rows per counter, ready for aggregation.
#[derive(Debug, Clone, Default)]
pub struct FieldRows {
    pub confirmed: Vec<SourceRow>,
    pub deaths: Vec<SourceRow>,
    pub recovered: Vec<SourceRow>,
}

impl FieldRows {
    pub fn get(&self, field: Field) -> &[SourceRow] {
        match field {
            Field::Confirmed => &self.confirmed,
            Field::Deaths => &self.deaths,
            Field::Recovered => &self.recovered,
        }
    }

    pub fn get_mut(&mut self, field: Field) -> &mut Vec<SourceRow> {
        match field {
            Field::Confirmed => &mut self.confirmed,
            Field::Deaths => &mut self.deaths,
            Field::Recovered => &mut self.recovered,
        }
    }
}

/// Parse a whole table. Rows without a country are skipped and reported.
pub fn parse_table(table: &RawTable, century: i32) -> Result<ParsedTable, SeriesError> {
    let schema = Schema::from_headers(&table.headers, century)?;

    let mut rows = Vec::with_capacity(table.rows.len());
    let mut issues = Vec::new();
    for (idx, raw) in table.rows.iter().enumerate() {
        // +2: 1-based, and the header occupies line 1.
        let line = idx + 2;
        match parse_row(&schema, raw, line) {
            Ok(row) => rows.push(row),
            Err(e) => issues.push(RowIssue {
                line,
                country: None,
                message: e.to_string(),
            }),
        }
    }

    Ok(ParsedTable { schema, rows, issues })
}

/// Parse one raw row against a schema.
///
/// Short rows are padded with nulls.
pub fn parse_row(schema: &Schema, raw: &[String], line: usize) -> Result<SourceRow, SeriesError> {
    let mut identity = Vec::new();
    let mut series = Vec::with_capacity(schema.date_count());

    for (idx, column) in schema.columns.iter().enumerate() {
        let token = raw.get(idx).map(String::as_str).unwrap_or("");
        match column {
            Column::Date(date) => series.push((*date, Cell::infer(token))),
            Column::Identity { name, role } => {
                let value = match role {
                    // Names stay names even if they happen to look numeric.
                    Role::Country | Role::Province => match token.trim() {
                        "" => Cell::Null,
                        s => Cell::Str(s.to_string()),
                    },
                    Role::Lat | Role::Long => Cell::infer(token).into_float(),
                    Role::Other => Cell::infer(token),
                };
                identity.push(IdentityCell {
                    name: name.clone(),
                    role: *role,
                    value,
                });
            }
        }
    }

    let row = SourceRow { line, identity, series };
    if row.country().is_none() {
        return Err(SeriesError::Schema(format!("Line {line}: missing country name")));
    }
    Ok(row)
}

/// Parse a `M/D/YY` header. The 2-digit year is placed in `century`.
pub fn parse_date_header(header: &str, century: i32) -> Option<NaiveDate> {
    let mut parts = header.trim().split('/');
    let (m, d, y) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    let is_digits = |s: &str, max_len: usize| !s.is_empty() && s.len() <= max_len && s.bytes().all(|b| b.is_ascii_digit());
    if !is_digits(m, 2) || !is_digits(d, 2) || y.len() != 2 || !is_digits(y, 2) {
        return None;
    }

    let month: u32 = m.parse().ok()?;
    let day: u32 = d.parse().ok()?;
    let yy: i32 = y.parse().ok()?;
    NaiveDate::from_ymd_opt(century * 100 + yy, month, day)
}

/// `floor(current_year / 100)`.
pub fn current_century() -> i32 {
    Local::now().year().div_euclid(100)
}

fn normalize_header_name(name: &str) -> String {
    // Some tools emit UTF-8 CSVs with a BOM on the first header; left in place it
    // hides the country column from schema detection.
    name.trim().trim_start_matches('\u{feff}').to_string()
}
