//! Derived epidemiological metrics.
//!
//! Everything here is a pure function of an immutable `CountrySeries` and is
//! recomputed on every call. Arrays are returned as `Derived<T>` so callers know
//! which series index each value belongs to.

pub mod diff;

pub use diff::DayDataDiff;

use crate::domain::{CountrySeries, Derived, Field};

/// Canonical rolling window (days).
pub const DEFAULT_WINDOW: usize = 7;

/// Converts a week-over-week ratio into a per-generation multiplier, assuming a
/// ~4-day serial interval.
pub const R_EXPONENT: f64 = 4.0 / 7.0;

/// `new[i] = confirmed[i+1] - confirmed[i]`.
///
/// The monotonic invariant of `CountrySeries` makes every entry non-negative.
pub fn new_cases_each_day(series: &CountrySeries) -> Derived<u64> {
    let confirmed = series.field_values(Field::Confirmed);
    let values = confirmed
        .windows(2)
        .map(|w| w[1].saturating_sub(w[0]))
        .collect();
    Derived { offset: 1, values }
}

/// `confirmed - recovered - deaths` for every day.
pub fn active_each_day(series: &CountrySeries) -> Derived<i64> {
    Derived {
        offset: 0,
        values: series.observations().iter().map(|o| o.active()).collect(),
    }
}

/// Trailing averages of new cases over `window` days.
///
/// The first value covers new-case indices `0..window`.
pub fn rolling_averages(new_cases: &[u64], window: usize) -> Vec<f64> {
    if window == 0 || new_cases.len() < window {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(new_cases.len() - window + 1);
    let mut running: u64 = new_cases[..window].iter().sum();
    out.push(running as f64 / window as f64);
    for i in window..new_cases.len() {
        running = running + new_cases[i] - new_cases[i - window];
        out.push(running as f64 / window as f64);
    }
    out
}

pub fn weekly_averages(series: &CountrySeries, window: usize) -> Derived<f64> {
    let new_cases = new_cases_each_day(series);
    Derived {
        offset: new_cases.offset + window.saturating_sub(1),
        values: rolling_averages(&new_cases.values, window),
    }
}

/// R from two averages one window apart.
///
/// `cur == 0` is checked first: no current transmission means R = 0 even with a zero
/// baseline. A zero baseline with current cases is treated as holding steady.
pub fn r_value(cur: f64, prev: f64) -> f64 {
    if cur == 0.0 {
        return 0.0;
    }
    if prev == 0.0 {
        return 1.0;
    }
    let r = (cur / prev).powf(R_EXPONENT);
    if r.is_finite() { r } else { 0.0 }
}

/// R values from a sequence of rolling averages: `r[j] = r_value(avg[j + window], avg[j])`.
pub fn r_values_from_averages(averages: &[f64], window: usize) -> Vec<f64> {
    if window == 0 || averages.len() <= window {
        return Vec::new();
    }
    (window..averages.len())
        .map(|j| r_value(averages[j], averages[j - window]))
        .collect()
}

pub fn r_values_each_day(series: &CountrySeries, window: usize) -> Derived<f64> {
    let averages = weekly_averages(series, window);
    Derived {
        offset: averages.offset + window,
        values: r_values_from_averages(&averages.values, window),
    }
}

impl CountrySeries {
    /// Latest cumulative confirmed count.
    pub fn total_confirmed(&self) -> Option<u64> {
        self.last().map(|o| o.confirmed)
    }

    /// Cases discovered on the latest day.
    pub fn new_cases(&self) -> Option<u64> {
        new_cases_each_day(self).last().copied()
    }

    /// Most recent R value, if the series spans two full windows.
    pub fn last_r_value(&self, window: usize) -> Option<f64> {
        r_values_each_day(self, window).last().copied()
    }
}
