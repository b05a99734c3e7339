//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - typed table cells and their merge rules (`Cell`, `combine`, `combine_counts`, `sum`)
//! - daily observations and the clean per-country series (`DailyObservation`, `CountrySeries`)
//! - run configuration (`RunConfig`, `DataSource`)

pub mod cell;
pub mod types;

pub use cell::{Cell, combine, combine_counts, sum};
pub use types::*;
