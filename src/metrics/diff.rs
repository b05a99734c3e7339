//! Comparisons between two days of a series.

use serde::Serialize;

use crate::domain::{CountrySeries, DailyObservation, Metric};
use crate::error::SeriesError;

/// Two observations of the same series, taken by position.
#[derive(Debug, Clone, Copy)]
pub struct DayDataDiff<'a> {
    pub newer: &'a DailyObservation,
    pub older: &'a DailyObservation,
}

impl<'a> DayDataDiff<'a> {
    pub fn new(newer: &'a DailyObservation, older: &'a DailyObservation) -> Self {
        Self { newer, older }
    }

    /// `newer - older` (signed).
    pub fn diff(&self, metric: Metric) -> i64 {
        self.newer.metric(metric).saturating_sub(self.older.metric(metric))
    }

    /// `(newer / older - 1) * 100`.
    ///
    /// A zero baseline has no meaningful percentage and is reported as
    /// `SeriesError::DivisionByZero`.
    pub fn percentage_diff(&self, metric: Metric) -> Result<f64, SeriesError> {
        let older = self.older.metric(metric);
        if older == 0 {
            return Err(SeriesError::DivisionByZero { metric });
        }
        Ok((self.newer.metric(metric) as f64 / older as f64 - 1.0) * 100.0)
    }

    /// All four metrics at once, for reports and exports.
    pub fn summary(&self) -> Vec<MetricChange> {
        Metric::ALL
            .iter()
            .map(|&metric| MetricChange {
                metric,
                current: self.newer.metric(metric),
                diff: self.diff(metric),
                percentage: self.percentage_diff(metric).ok(),
            })
            .collect()
    }
}

/// One row of a `DayDataDiff::summary`. `percentage` is `None` for a zero baseline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricChange {
    pub metric: Metric,
    pub current: i64,
    pub diff: i64,
    pub percentage: Option<f64>,
}

impl CountrySeries {
    /// Compare two positions of the series.
    pub fn diff_between(&self, newer: usize, older: usize) -> Result<DayDataDiff<'_>, SeriesError> {
        let at = |idx: usize| {
            self.get(idx).ok_or(SeriesError::DayOutOfRange {
                requested: idx,
                available: self.len(),
            })
        };
        Ok(DayDataDiff::new(at(newer)?, at(older)?))
    }

    /// Compare days counted back from the end: `1` is the latest day, `2` the one before.
    pub fn compare_days_back(&self, newer_back: usize, older_back: usize) -> Result<DayDataDiff<'_>, SeriesError> {
        let index = |back: usize| {
            if back == 0 || back > self.len() {
                return Err(SeriesError::DayOutOfRange {
                    requested: back,
                    available: self.len(),
                });
            }
            Ok(self.len() - back)
        };
        self.diff_between(index(newer_back)?, index(older_back)?)
    }

    /// Latest day against the day before.
    pub fn compare_to_yesterday(&self) -> Result<DayDataDiff<'_>, SeriesError> {
        self.compare_days_back(1, 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::enforce_series;
    use chrono::NaiveDate;

    fn obs(day: u32, confirmed: u64, deaths: u64, recovered: u64) -> DailyObservation {
        DailyObservation {
            country: "Israel".to_string(),
            province: None,
            date: NaiveDate::from_ymd_opt(2020, 4, day).unwrap(),
            confirmed,
            deaths,
            recovered,
            lat: None,
            long: None,
        }
    }

    fn series() -> CountrySeries {
        enforce_series(
            "Israel",
            vec![obs(1, 0, 0, 0), obs(2, 100, 2, 10), obs(3, 150, 2, 40)],
        )
        .0
    }

    #[test]
    fn yesterday_diff_and_percentage() {
        let s = series();
        let d = s.compare_to_yesterday().unwrap();
        assert_eq!(d.diff(Metric::Confirmed), 50);
        assert_eq!(d.diff(Metric::Deaths), 0);
        // Active: 108 today vs 88 yesterday.
        assert_eq!(d.diff(Metric::Active), 20);
        assert!((d.percentage_diff(Metric::Confirmed).unwrap() - 50.0).abs() < 1e-12);
        assert!((d.percentage_diff(Metric::Recovered).unwrap() - 300.0).abs() < 1e-12);
    }

    #[test]
    fn zero_baseline_is_division_by_zero() {
        let s = series();
        let d = s.diff_between(1, 0).unwrap();
        assert_eq!(d.diff(Metric::Confirmed), 100);
        assert_eq!(
            d.percentage_diff(Metric::Confirmed),
            Err(SeriesError::DivisionByZero {
                metric: Metric::Confirmed
            })
        );
        let summary = d.summary();
        assert_eq!(summary.len(), 4);
        assert_eq!(summary[0].percentage, None);
    }

    #[test]
    fn days_back_are_counted_from_the_end() {
        let s = series();
        let d = s.compare_days_back(1, 3).unwrap();
        assert_eq!(d.newer.confirmed, 150);
        assert_eq!(d.older.confirmed, 0);

        assert!(matches!(
            s.compare_days_back(1, 4),
            Err(SeriesError::DayOutOfRange { requested: 4, available: 3 })
        ));
        assert!(s.compare_days_back(0, 1).is_err());
    }

    #[test]
    fn single_day_series_has_no_yesterday() {
        let s = enforce_series("Israel", vec![obs(1, 5, 0, 0)]).0;
        assert!(s.compare_to_yesterday().is_err());
    }
}
