//! Shared domain types.
//!
//! These types are kept small and serializable so they can be:
//!
//! - passed between normalization stages without copying source tables around
//! - exported to JSON/CSV
//! - rendered by the report/plot layer

use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Cumulative counters tracked per day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Confirmed,
    Deaths,
    Recovered,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Confirmed, Field::Deaths, Field::Recovered];

    pub fn display_name(self) -> &'static str {
        match self {
            Field::Confirmed => "confirmed",
            Field::Deaths => "deaths",
            Field::Recovered => "recovered",
        }
    }
}

/// Everything a `DayDataDiff` can compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Confirmed,
    Deaths,
    Recovered,
    Active,
}

impl Metric {
    pub const ALL: [Metric; 4] = [Metric::Confirmed, Metric::Deaths, Metric::Recovered, Metric::Active];

    pub fn display_name(self) -> &'static str {
        match self {
            Metric::Confirmed => "Confirmed",
            Metric::Deaths => "Deaths",
            Metric::Recovered => "Recovered",
            Metric::Active => "Active Cases",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One country (or province) on one calendar day. Counts are cumulative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyObservation {
    pub country: String,
    pub province: Option<String>,
    pub date: NaiveDate,
    pub confirmed: u64,
    pub deaths: u64,
    pub recovered: u64,
    pub lat: Option<f64>,
    pub long: Option<f64>,
}

impl DailyObservation {
    pub fn field(&self, field: Field) -> u64 {
        match field {
            Field::Confirmed => self.confirmed,
            Field::Deaths => self.deaths,
            Field::Recovered => self.recovered,
        }
    }

    pub fn set_field(&mut self, field: Field, value: u64) {
        match field {
            Field::Confirmed => self.confirmed = value,
            Field::Deaths => self.deaths = value,
            Field::Recovered => self.recovered = value,
        }
    }

    /// `confirmed - recovered - deaths`.
    ///
    /// Signed: sources that report more recoveries than confirmed cases exist.
    pub fn active(&self) -> i64 {
        signed(self.confirmed)
            .saturating_sub(signed(self.recovered))
            .saturating_sub(signed(self.deaths))
    }

    pub fn metric(&self, metric: Metric) -> i64 {
        match metric {
            Metric::Confirmed => signed(self.confirmed),
            Metric::Deaths => signed(self.deaths),
            Metric::Recovered => signed(self.recovered),
            Metric::Active => self.active(),
        }
    }
}

// Counts above `i64::MAX` never pass ingest; saturate rather than wrap regardless.
fn signed(count: u64) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}

/// A single country's clean daily series.
///
/// Invariants (established by `normalize::monotonic::enforce_series`):
/// - dates strictly increasing
/// - confirmed/deaths/recovered non-decreasing
///
/// The series is immutable once built; derived metrics live in `crate::metrics`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountrySeries {
    country: String,
    observations: Vec<DailyObservation>,
}

impl CountrySeries {
    pub(crate) fn from_clean(country: String, observations: Vec<DailyObservation>) -> Self {
        Self { country, observations }
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn observations(&self) -> &[DailyObservation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&DailyObservation> {
        self.observations.get(index)
    }

    pub fn first(&self) -> Option<&DailyObservation> {
        self.observations.first()
    }

    pub fn last(&self) -> Option<&DailyObservation> {
        self.observations.last()
    }

    pub fn field_values(&self, field: Field) -> Vec<u64> {
        self.observations.iter().map(|o| o.field(field)).collect()
    }
}

/// A derived array aligned to a `CountrySeries`.
///
/// `values[k]` belongs to series index `offset + k`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Derived<T> {
    pub offset: usize,
    pub values: Vec<T>,
}

impl<T> Derived<T> {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn last(&self) -> Option<&T> {
        self.values.last()
    }

    /// The last `n` values (or all of them if shorter).
    pub fn tail(&self, n: usize) -> &[T] {
        let start = self.values.len().saturating_sub(n);
        &self.values[start..]
    }
}

/// Where the raw tables come from.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    /// Download the JHU CSSE global time-series CSVs.
    Remote { base_url: String },
    /// Local CSV tables (several files per field are merged).
    Tables {
        confirmed: Vec<PathBuf>,
        deaths: Vec<PathBuf>,
        recovered: Vec<PathBuf>,
    },
    /// Local JSON file of per-day records.
    Records { path: PathBuf },
}

/// A full run's configuration as understood by the pipeline.
///
/// Derived from CLI flags and environment (plus defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub source: DataSource,
    /// Rolling-average window (days) used for averages and R values.
    pub window: usize,
    /// Century used to expand `M/D/YY` headers (`20` for 20xx).
    pub century: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(confirmed: u64, deaths: u64, recovered: u64) -> DailyObservation {
        DailyObservation {
            country: "Chile".to_string(),
            province: None,
            date: NaiveDate::from_ymd_opt(2020, 3, 1).unwrap(),
            confirmed,
            deaths,
            recovered,
            lat: None,
            long: None,
        }
    }

    #[test]
    fn active_can_be_negative() {
        assert_eq!(observation(10, 2, 3).active(), 5);
        assert_eq!(observation(5, 1, 9).active(), -5);
    }

    #[test]
    fn huge_counts_saturate_instead_of_wrapping() {
        let obs = observation(u64::MAX, 0, u64::MAX);
        assert_eq!(obs.metric(Metric::Confirmed), i64::MAX);
        assert_eq!(obs.active(), 0);
        assert_eq!(observation(0, i64::MAX as u64, i64::MAX as u64).active(), i64::MIN);
    }
}
