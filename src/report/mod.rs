//! Reporting utilities: per-country summaries.
//!
//! `summarize` gathers everything a front-end shows about one country; `format`
//! turns it (and the dataset) into terminal text.

pub mod format;

pub use format::*;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::CountrySeries;
use crate::error::SeriesError;
use crate::metrics::diff::MetricChange;
use crate::normalize::ClampReport;

/// Headline numbers of one country on its latest day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountrySummary {
    pub country: String,
    pub first_date: NaiveDate,
    pub latest_date: NaiveDate,
    pub days: usize,
    pub window: usize,
    pub total_confirmed: u64,
    pub new_cases: Option<u64>,
    pub r_value: Option<f64>,
    /// Latest day against the day before; empty for a one-day series.
    pub changes: Vec<MetricChange>,
    pub quality: ClampReport,
}

pub fn summarize(series: &CountrySeries, quality: Option<&ClampReport>, window: usize) -> Result<CountrySummary, SeriesError> {
    let (Some(first), Some(latest)) = (series.first(), series.last()) else {
        return Err(SeriesError::DayOutOfRange {
            requested: 1,
            available: 0,
        });
    };

    let changes = match series.compare_to_yesterday() {
        Ok(diff) => diff.summary(),
        Err(_) => Vec::new(),
    };

    Ok(CountrySummary {
        country: series.country().to_string(),
        first_date: first.date,
        latest_date: latest.date,
        days: series.len(),
        window,
        total_confirmed: latest.confirmed,
        new_cases: series.new_cases(),
        r_value: series.last_r_value(window),
        changes,
        quality: quality.copied().unwrap_or_default(),
    })
}
