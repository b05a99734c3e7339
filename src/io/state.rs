//! "Is there new data?" state, persisted as a small JSON file.
//!
//! The file maps country names to the latest date already seen:
//!
//! ```json
//! { "latest": { "Israel": "2020-04-03" } }
//! ```

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeenState {
    #[serde(default)]
    pub latest: BTreeMap<String, NaiveDate>,
}

/// Outcome of a freshness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// `latest` is newer than anything recorded (or nothing was recorded).
    New { previous: Option<NaiveDate>, latest: NaiveDate },
    Unchanged { latest: NaiveDate },
}

impl Freshness {
    pub fn is_new(&self) -> bool {
        matches!(self, Freshness::New { .. })
    }
}

impl SeenState {
    /// Load the state; a missing file is an empty state.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .map_err(|e| AppError::new(2, format!("Failed to read state '{}': {e}", path.display())))?;
        serde_json::from_str(&text)
            .map_err(|e| AppError::new(2, format!("Invalid state JSON '{}': {e}", path.display())))
    }

    pub fn save(&self, path: &Path) -> Result<(), AppError> {
        let file = File::create(path)
            .map_err(|e| AppError::new(2, format!("Failed to create state '{}': {e}", path.display())))?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| AppError::new(4, format!("Failed to write state JSON: {e}")))
    }

    /// Compare `latest` with the recorded date, then record it.
    pub fn check_and_record(&mut self, country: &str, latest: NaiveDate) -> Freshness {
        let previous = self.latest.get(country).copied();
        match previous {
            Some(prev) if prev >= latest => Freshness::Unchanged { latest: prev },
            _ => {
                self.latest.insert(country.to_string(), latest);
                Freshness::New { previous, latest }
            }
        }
    }
}
