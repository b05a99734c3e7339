//! Error types.
//!
//! Two layers:
//! - `SeriesError` / `MergeError`: typed failures of the normalization and metrics core
//! - `AppError`: what the binary reports (message + process exit code)

use thiserror::Error;

use crate::domain::Metric;

/// Failure while combining two cells or rows.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MergeError {
    #[error("integer overflow while summing {a} and {b}")]
    Overflow { a: i64, b: i64 },

    #[error("cannot sum non-numeric value '{value}' on {date}")]
    NonNumeric { value: String, date: chrono::NaiveDate },
}

/// Errors surfaced by the core to its callers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SeriesError {
    /// The raw table cannot be interpreted (no country column, no date columns, ...).
    #[error("Schema error: {0}")]
    Schema(String),

    /// Lookup by country name found nothing.
    #[error("Unknown country: '{0}'")]
    UnknownCountry(String),

    /// Percentage change against a zero baseline.
    #[error("Cannot compute percentage change of {metric}: older value is 0")]
    DivisionByZero { metric: Metric },

    /// A day index outside the series was requested.
    #[error("Day {requested} is out of range (series has {available} days)")]
    DayOutOfRange { requested: usize, available: usize },

    #[error("Merge error: {0}")]
    Merge(#[from] MergeError),
}

impl SeriesError {
    /// Process exit code used when this error reaches `main`.
    pub fn exit_code(&self) -> u8 {
        match self {
            SeriesError::Schema(_) => 2,
            SeriesError::UnknownCountry(_) => 3,
            SeriesError::DivisionByZero { .. }
            | SeriesError::DayOutOfRange { .. }
            | SeriesError::Merge(_) => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<SeriesError> for AppError {
    fn from(err: SeriesError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_errors_map_to_exit_codes() {
        let err: AppError = SeriesError::UnknownCountry("Atlantis".to_string()).into();
        assert_eq!(err.exit_code(), 3);
        assert_eq!(err.to_string(), "Unknown country: 'Atlantis'");

        let err: AppError = SeriesError::Schema("no date columns".to_string()).into();
        assert_eq!(err.exit_code(), 2);
    }
}
