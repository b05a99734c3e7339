//! JHU CSSE time-series download.
//!
//! The repository publishes one wide CSV per counter (`confirmed`, `deaths`,
//! `recovered`); each is fetched once per run and handed to ingest unchanged.

use reqwest::blocking::Client;

use crate::domain::Field;
use crate::error::AppError;
use crate::io::ingest::RawTable;

pub const DEFAULT_BASE_URL: &str =
    "https://raw.githubusercontent.com/CSSEGISandData/COVID-19/master/csse_covid_19_data/csse_covid_19_time_series";

pub struct JhuClient {
    client: Client,
    base_url: String,
}

impl JhuClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn table_url(&self, field: Field) -> String {
        format!(
            "{}/time_series_covid19_{}_global.csv",
            self.base_url.trim_end_matches('/'),
            field.display_name()
        )
    }

    /// Download the table of one counter.
    pub fn fetch_table(&self, field: Field) -> Result<RawTable, AppError> {
        let url = self.table_url(field);
        tracing::info!(%url, "downloading {} table", field.display_name());

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| AppError::new(4, format!("JHU request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::new(
                4,
                format!("JHU request for {url} failed with status {}.", resp.status()),
            ));
        }

        let body = resp
            .text()
            .map_err(|e| AppError::new(4, format!("Failed to read JHU response: {e}")))?;
        Ok(RawTable::from_csv_str(&body)?)
    }

    /// Download all three tables.
    pub fn fetch_all(&self) -> Result<Vec<(Field, RawTable)>, AppError> {
        let mut tables = Vec::with_capacity(Field::ALL.len());
        for field in Field::ALL {
            tables.push((field, self.fetch_table(field)?));
        }
        Ok(tables)
    }
}
