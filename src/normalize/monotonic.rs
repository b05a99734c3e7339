//! Enforcing monotonic cumulative counters.
//!
//! Data sources occasionally revise a cumulative total downwards. New-case counts are
//! differences of consecutive totals, so a downward revision would produce a negative
//! day. The enforcer freezes a counter at its last known value instead
//! (`value[d] = max(value[d], value[d-1])`) and reports how often it had to.

use serde::Serialize;

use crate::domain::{CountrySeries, DailyObservation, Field};

/// How many cells the enforcer clamped (a non-fatal data-quality warning).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClampReport {
    pub confirmed: usize,
    pub deaths: usize,
    pub recovered: usize,
    /// Total inspected cells (days × fields).
    pub cells: usize,
}

impl ClampReport {
    pub fn clamped(&self) -> usize {
        self.confirmed + self.deaths + self.recovered
    }

    /// Share of inspected cells that were clamped, in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        if self.cells == 0 {
            return 0.0;
        }
        self.clamped() as f64 / self.cells as f64
    }

    fn bump(&mut self, field: Field) {
        match field {
            Field::Confirmed => self.confirmed += 1,
            Field::Deaths => self.deaths += 1,
            Field::Recovered => self.recovered += 1,
        }
    }
}

/// Clamp every downward step in a date-ordered sequence.
///
/// Returns a new sequence; the input is left untouched.
pub fn enforce(observations: &[DailyObservation]) -> (Vec<DailyObservation>, ClampReport) {
    let mut out: Vec<DailyObservation> = Vec::with_capacity(observations.len());
    let mut report = ClampReport {
        cells: observations.len() * Field::ALL.len(),
        ..ClampReport::default()
    };

    for obs in observations {
        let mut fixed = obs.clone();
        if let Some(prev) = out.last() {
            for field in Field::ALL {
                let floor = prev.field(field);
                if fixed.field(field) < floor {
                    fixed.set_field(field, floor);
                    report.bump(field);
                }
            }
        }
        out.push(fixed);
    }

    (out, report)
}

/// Build a clean `CountrySeries`: order by date, keep one observation per date, clamp.
pub fn enforce_series(country: &str, mut observations: Vec<DailyObservation>) -> (CountrySeries, ClampReport) {
    observations.sort_by_key(|o| o.date);
    observations.dedup_by_key(|o| o.date);

    let (clean, report) = enforce(&observations);
    if report.clamped() > 0 {
        tracing::warn!(
            country,
            clamped = report.clamped(),
            confirmed = report.confirmed,
            deaths = report.deaths,
            recovered = report.recovered,
            "clamped {:.3}% of cumulative cells that decreased",
            report.fraction() * 100.0
        );
    }

    (CountrySeries::from_clean(country.to_string(), clean), report)
}
