//! `covid-stats` library crate.
//!
//! The binary (`covid`) is a thin wrapper around this library so that:
//!
//! - the normalization and metrics core is testable without spawning processes
//! - the dataset can be reused by other front-ends
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod metrics;
pub mod normalize;
pub mod plot;
pub mod report;
