//! Merging duplicate reports of the same series.
//!
//! Two rows with the same identity (same country and province) are combined into one
//! time-aligned row: the dates are the union of both rows in first-seen order, and the
//! values are summed. A date missing from one row contributes 0, so partial duplicate
//! reports add up instead of overwriting each other.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::domain::{Cell, combine, sum};
use crate::error::MergeError;
use crate::io::ingest::{IdentityCell, SourceRow};

/// Identity key of a row: `(country, province)`.
pub type RowKey = (String, Option<String>);

pub fn row_key(row: &SourceRow) -> RowKey {
    (
        row.country().unwrap_or_default().to_string(),
        row.province().map(str::to_string),
    )
}

/// Merge two rows describing the same identity.
pub fn merge_rows(a: &SourceRow, b: &SourceRow) -> Result<SourceRow, MergeError> {
    let identity = merge_identity(&a.identity, &b.identity)?;

    let mut series: Vec<(NaiveDate, Cell)> = Vec::with_capacity(a.series.len().max(b.series.len()));
    let mut index: HashMap<NaiveDate, usize> = HashMap::with_capacity(series.capacity());

    for (date, value) in a.series.iter().chain(b.series.iter()) {
        match index.get(date) {
            Some(&pos) => {
                let merged = sum(&series[pos].1, value, *date)?;
                series[pos].1 = merged;
            }
            None => {
                index.insert(*date, series.len());
                series.push((*date, value.clone()));
            }
        }
    }

    Ok(SourceRow {
        line: a.line,
        identity,
        series,
    })
}

/// Collapse every group of rows sharing a `(country, province)` key into one row.
///
/// Groups come out in the order their first row appeared.
pub fn merge_duplicates(rows: &[SourceRow]) -> Result<Vec<SourceRow>, MergeError> {
    let mut merged: Vec<SourceRow> = Vec::new();
    let mut index: HashMap<RowKey, usize> = HashMap::new();

    for row in rows {
        let key = row_key(row);
        match index.get(&key) {
            Some(&pos) => {
                let combined = merge_rows(&merged[pos], row)?;
                merged[pos] = combined;
            }
            None => {
                index.insert(key, merged.len());
                merged.push(row.clone());
            }
        }
    }

    if merged.len() < rows.len() {
        tracing::debug!(rows = rows.len(), merged = merged.len(), "merged duplicate rows");
    }
    Ok(merged)
}

/// Identity cells are matched by column name; cells only one side has are kept.
pub(crate) fn merge_identity(a: &[IdentityCell], b: &[IdentityCell]) -> Result<Vec<IdentityCell>, MergeError> {
    let mut out = Vec::with_capacity(a.len().max(b.len()));
    for cell in a {
        let value = match b.iter().find(|other| other.name == cell.name) {
            Some(other) => combine(&cell.value, &other.value)?,
            None => cell.value.clone(),
        };
        out.push(IdentityCell {
            name: cell.name.clone(),
            role: cell.role,
            value,
        });
    }
    for cell in b {
        if !a.iter().any(|other| other.name == cell.name) {
            out.push(cell.clone());
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ingest::Role;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 4, day).unwrap()
    }

    fn row(country: &str, series: &[(NaiveDate, i64)]) -> SourceRow {
        SourceRow {
            line: 0,
            identity: vec![IdentityCell {
                name: "Country/Region".to_string(),
                role: Role::Country,
                value: Cell::Str(country.to_string()),
            }],
            series: series.iter().map(|(date, v)| (*date, Cell::Int(*v))).collect(),
        }
    }

    #[test]
    fn duplicate_rows_union_dates_and_sum() {
        let a = row("Canada", &[(d(1), 5), (d(2), 7)]);
        let b = row("Canada", &[(d(1), 3), (d(3), 9)]);

        let merged = merge_rows(&a, &b).unwrap();
        assert_eq!(merged.country(), Some("Canada"));
        assert_eq!(
            merged.series,
            vec![(d(1), Cell::Int(8)), (d(2), Cell::Int(7)), (d(3), Cell::Int(9))]
        );
    }

    #[test]
    fn null_cells_contribute_nothing() {
        let a = row("Chile", &[(d(1), 5)]);
        let mut b = row("Chile", &[]);
        b.series.push((d(1), Cell::Null));

        let merged = merge_rows(&a, &b).unwrap();
        assert_eq!(merged.series, vec![(d(1), Cell::Int(5))]);
    }

    #[test]
    fn merge_duplicates_keeps_first_seen_order() {
        let rows = vec![
            row("Peru", &[(d(1), 1)]),
            row("Chile", &[(d(1), 2)]),
            row("Peru", &[(d(1), 4)]),
        ];
        let merged = merge_duplicates(&rows).unwrap();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].country(), Some("Peru"));
        assert_eq!(merged[0].series, vec![(d(1), Cell::Int(5))]);
        assert_eq!(merged[1].country(), Some("Chile"));
    }
}
