//! Data sources feeding the pipeline.
//!
//! A [`DataSource`] produces [`RawData`] once per run. Records are shaped into
//! a table by the validate stage, so a source never has to know about
//! DataFrames unless it reads something already tabular.

#[cfg(feature = "http")]
mod api;
mod file;

#[cfg(feature = "http")]
pub use api::{ApiClient, ApiDataSource};
pub use file::{FileDataSource, SourceFormat};

use crate::cleaner::dataset_from_records;
use crate::error::{SourceError, ValidationError};
use crate::utils::all_missing_as_float;
use polars::prelude::DataFrame;
use serde_json::Value;

/// What a source hands to the pipeline.
#[derive(Debug, Clone)]
pub enum RawData {
    /// JSON-like records, in any shape accepted by [`dataset_from_records`].
    Records(Value),
    /// An already tabular dataset.
    Table(DataFrame),
}

impl RawData {
    /// Shape the raw data into a table.
    ///
    /// Columns of a ready table that hold only missing values become
    /// `Float64`, the same typing records get.
    pub fn into_dataset(self) -> Result<DataFrame, ValidationError> {
        match self {
            Self::Records(value) => dataset_from_records(&value),
            Self::Table(df) => {
                all_missing_as_float(df).map_err(|e| ValidationError::Build(e.to_string()))
            }
        }
    }
}

impl From<Value> for RawData {
    fn from(value: Value) -> Self {
        Self::Records(value)
    }
}

impl From<DataFrame> for RawData {
    fn from(df: DataFrame) -> Self {
        Self::Table(df)
    }
}

/// Produces the raw data for a pipeline run.
///
/// Sources are shared between runs, so `fetch` takes `&self` and must be
/// repeatable.
pub trait DataSource: Send + Sync {
    fn fetch(&self) -> Result<RawData, SourceError>;

    /// Name used in logs and the run report.
    fn name(&self) -> &str {
        "source"
    }
}

/// A source that always returns the same in-memory data.
#[derive(Debug, Clone)]
pub struct StaticSource {
    data: RawData,
}

impl StaticSource {
    pub fn new(data: impl Into<RawData>) -> Self {
        Self { data: data.into() }
    }
}

impl DataSource for StaticSource {
    fn fetch(&self) -> Result<RawData, SourceError> {
        Ok(self.data.clone())
    }

    fn name(&self) -> &str {
        "static"
    }
}
