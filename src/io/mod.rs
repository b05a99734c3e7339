//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - JSON day records (`records`)
//! - dataset exports (CSV/JSON) (`export`)
//! - last-seen state for `covid check` (`state`)

pub mod export;
pub mod ingest;
pub mod records;
pub mod state;

pub use export::*;
pub use ingest::*;
pub use records::*;
pub use state::*;
