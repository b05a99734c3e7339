//! Collapsing provinces/states into one row per country.
//!
//! Some countries (Canada, Australia, China, ...) are reported per province. The
//! aggregator groups rows by country and folds each group: counts are summed
//! (`combine_counts`), coordinates averaged and names kept or joined (`combine`).
//!
//! A date only some provinces report is unknown for the whole country, so it becomes
//! `Null` (and later a reported gap) rather than a partial sum.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;

use crate::domain::{Cell, combine_counts};
use crate::error::MergeError;
use crate::io::ingest::SourceRow;
use crate::normalize::merge::{merge_duplicates, merge_identity};

/// Aggregate rows into one row per country.
///
/// Rows sharing both country and province are first merged as duplicates.
pub fn aggregate_provinces(rows: &[SourceRow]) -> Result<BTreeMap<String, SourceRow>, MergeError> {
    let rows = merge_duplicates(rows)?;

    let mut groups: BTreeMap<String, Vec<&SourceRow>> = BTreeMap::new();
    for row in &rows {
        if let Some(country) = row.country() {
            groups.entry(country.to_string()).or_default().push(row);
        }
    }

    let mut out = BTreeMap::new();
    for (country, members) in groups {
        let mut iter = members.into_iter();
        let Some(first) = iter.next() else { continue };
        let folded = iter.try_fold(first.clone(), |acc, row| combine_rows(&acc, row))?;
        out.insert(country, folded);
    }
    Ok(out)
}

/// Combine two province rows of the same country.
pub fn combine_rows(a: &SourceRow, b: &SourceRow) -> Result<SourceRow, MergeError> {
    let identity = merge_identity(&a.identity, &b.identity)?;

    let b_by_date: HashMap<NaiveDate, &Cell> = b.series.iter().map(|(d, c)| (*d, c)).collect();
    let mut seen: HashSet<NaiveDate> = HashSet::with_capacity(a.series.len());

    let mut series = Vec::with_capacity(a.series.len().max(b.series.len()));
    for (date, value) in &a.series {
        seen.insert(*date);
        let merged = match b_by_date.get(date) {
            Some(other) => combine_counts(value, other)?,
            None => Cell::Null,
        };
        series.push((*date, merged));
    }
    for (date, _) in &b.series {
        if !seen.contains(date) {
            series.push((*date, Cell::Null));
        }
    }

    Ok(SourceRow {
        line: a.line,
        identity,
        series,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ingest::{RawTable, parse_table};

    const TABLE: &str = "Province/State,Country/Region,Lat,Long,3/1/20,3/2/20\n\
        Alberta,Canada,50,-110,1,2\n\
        Ontario,Canada,40.5,-80,3,4\n\
        ,Israel,31,35,5,6\n\
        Quebec,Canada,45,-70,1,\n";

    fn aggregated() -> BTreeMap<String, SourceRow> {
        let table = RawTable::from_csv_str(TABLE).unwrap();
        let parsed = parse_table(&table, 20).unwrap();
        aggregate_provinces(&parsed.rows).unwrap()
    }

    #[test]
    fn provinces_sum_into_one_country_row() {
        let rows = aggregated();
        assert_eq!(rows.len(), 2);

        let canada = &rows["Canada"];
        assert_eq!(canada.series[0].1, Cell::Int(5));
        // Quebec has no value on 3/2, so the national value is unknown.
        assert_eq!(canada.series[1].1, Cell::Null);
        assert_eq!(canada.province(), Some("Alberta, Ontario, Quebec"));
    }

    #[test]
    fn coordinates_are_pairwise_averaged() {
        let rows = aggregated();
        // ((50 + 40.5) / 2 + 45) / 2
        assert_eq!(rows["Canada"].lat(), Some(45.125));
    }

    #[test]
    fn float_counts_are_summed_not_averaged() {
        let table = RawTable::from_csv_str(
            "Province/State,Country/Region,Lat,Long,3/1/20,3/2/20\n\
             Alberta,Canada,50,-110,10.0,20.0\n\
             Ontario,Canada,40,-80,30.0,40\n",
        )
        .unwrap();
        let parsed = parse_table(&table, 20).unwrap();
        let rows = aggregate_provinces(&parsed.rows).unwrap();

        let canada = &rows["Canada"];
        assert_eq!(canada.series[0].1, Cell::Float(40.0));
        assert_eq!(canada.series[1].1, Cell::Float(60.0));
        assert_eq!(canada.lat(), Some(45.0));
    }

    #[test]
    fn single_province_country_is_unchanged() {
        let rows = aggregated();
        let israel = &rows["Israel"];
        assert_eq!(israel.series[0].1, Cell::Int(5));
        assert_eq!(israel.series[1].1, Cell::Int(6));
        assert_eq!(israel.lat(), Some(31.0));
    }
}
