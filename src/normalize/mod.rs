//! Normalization stages between typed rows and clean series.
//!
//! - `merge`: duplicate rows for the same identity (date union + sum)
//! - `province`: provinces/states into one row per country
//! - `monotonic`: cumulative counters never decrease

pub mod merge;
pub mod monotonic;
pub mod province;

pub use merge::{merge_duplicates, merge_rows};
pub use monotonic::{ClampReport, enforce, enforce_series};
pub use province::aggregate_provinces;
