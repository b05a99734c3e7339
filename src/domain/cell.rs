//! Typed table cells.
//!
//! Raw sources deliver every cell as a string. We infer the most specific type once,
//! at parse time, and every later stage works on this closed set of tags.

use serde::{Deserialize, Serialize};

use crate::error::MergeError;

/// A single parsed cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Int(i64),
    Float(f64),
    Str(String),
    Null,
}

impl Cell {
    /// Infer the most specific cell type for a raw token.
    ///
    /// Order: integer, finite float, non-empty string, null.
    pub fn infer(token: &str) -> Cell {
        let token = token.trim();
        if token.is_empty() {
            return Cell::Null;
        }
        if let Ok(v) = token.parse::<i64>() {
            return Cell::Int(v);
        }
        match token.parse::<f64>() {
            Ok(v) if v.is_finite() => Cell::Float(v),
            _ => Cell::Str(token.to_string()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(v) => Some(*v as f64),
            Cell::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Interpret the cell as a cumulative count.
    ///
    /// Accepts non-negative integers and integral non-negative floats (some exports
    /// write `12.0`). Everything else is not a count.
    ///
    /// Counts are capped at `i64::MAX` so signed differences never wrap.
    pub fn as_count(&self) -> Option<u64> {
        match self {
            Cell::Int(v) => u64::try_from(*v).ok(),
            // `i64::MAX as f64` rounds up to 2^63, hence the strict bound.
            Cell::Float(v) if *v >= 0.0 && v.fract() == 0.0 && *v < i64::MAX as f64 => Some(*v as u64),
            _ => None,
        }
    }

    /// Coerce numeric cells to `Float` (used for latitude/longitude columns so that
    /// `0` and `12.5` share a tag).
    pub fn into_float(self) -> Cell {
        match self {
            Cell::Int(v) => Cell::Float(v as f64),
            other => other,
        }
    }
}

/// Combine two identity cells of two different rows.
///
/// - integers are summed
/// - floats are averaged (only coordinates are floats; an approximation, not a centroid)
/// - equal strings are kept, different strings are joined with `", "` (distinct only)
/// - any tag mismatch, including value vs `Null`, yields `Null`
pub fn combine(a: &Cell, b: &Cell) -> Result<Cell, MergeError> {
    match (a, b) {
        (Cell::Int(x), Cell::Int(y)) => x
            .checked_add(*y)
            .map(Cell::Int)
            .ok_or(MergeError::Overflow { a: *x, b: *y }),
        (Cell::Float(x), Cell::Float(y)) => Ok(Cell::Float((x + y) / 2.0)),
        (Cell::Str(x), Cell::Str(y)) => Ok(Cell::Str(join_distinct(x, y))),
        _ => Ok(Cell::Null),
    }
}

/// Combine two count cells of the same date from two different provinces.
///
/// Numbers are summed (mixed int/float sums as a float). Anything else, including a
/// value next to `Null`, yields `Null`: the national count for that date is unknown.
pub fn combine_counts(a: &Cell, b: &Cell) -> Result<Cell, MergeError> {
    match (a, b) {
        (Cell::Int(x), Cell::Int(y)) => x
            .checked_add(*y)
            .map(Cell::Int)
            .ok_or(MergeError::Overflow { a: *x, b: *y }),
        (Cell::Float(x), Cell::Float(y)) => Ok(Cell::Float(x + y)),
        (Cell::Int(x), Cell::Float(y)) | (Cell::Float(y), Cell::Int(x)) => Ok(Cell::Float(*x as f64 + y)),
        _ => Ok(Cell::Null),
    }
}

/// Additive sum used when merging duplicate reports of the same series.
///
/// `Null` is the identity element, so a missing contribution counts as 0.
pub fn sum(a: &Cell, b: &Cell, date: chrono::NaiveDate) -> Result<Cell, MergeError> {
    match (a, b) {
        (Cell::Null, other) | (other, Cell::Null) => match other {
            Cell::Str(s) => Err(MergeError::NonNumeric { value: s.clone(), date }),
            _ => Ok(other.clone()),
        },
        (Cell::Int(x), Cell::Int(y)) => x
            .checked_add(*y)
            .map(Cell::Int)
            .ok_or(MergeError::Overflow { a: *x, b: *y }),
        (Cell::Float(x), Cell::Float(y)) => Ok(Cell::Float(x + y)),
        (Cell::Int(x), Cell::Float(y)) | (Cell::Float(y), Cell::Int(x)) => Ok(Cell::Float(*x as f64 + y)),
        (Cell::Str(s), _) | (_, Cell::Str(s)) => Err(MergeError::NonNumeric { value: s.clone(), date }),
    }
}

fn join_distinct(existing: &str, incoming: &str) -> String {
    if existing.split(", ").any(|part| part == incoming) {
        return existing.to_string();
    }
    format!("{existing}, {incoming}")
}
