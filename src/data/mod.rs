//! Data acquisition and the processed dataset.

pub mod dataset;
pub mod jhu;

pub use dataset::Dataset;
pub use jhu::JhuClient;
