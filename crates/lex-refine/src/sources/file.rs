use super::{DataSource, RawData};
use crate::error::SourceError;
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

/// How a file source decodes its file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Json,
    Csv,
}

impl SourceFormat {
    /// Infer the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, SourceError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        extension.parse()
    }
}

impl FromStr for SourceFormat {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(SourceError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Reads a dataset from a JSON or CSV file on every fetch.
#[derive(Debug, Clone)]
pub struct FileDataSource {
    path: PathBuf,
    format: SourceFormat,
}

impl FileDataSource {
    pub fn new(path: impl Into<PathBuf>, format: SourceFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    /// Create a source whose format follows the file extension.
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self, SourceError> {
        let path = path.into();
        let format = SourceFormat::from_path(&path)?;
        Ok(Self { path, format })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> SourceFormat {
        self.format
    }
}

impl DataSource for FileDataSource {
    fn fetch(&self) -> Result<RawData, SourceError> {
        info!("Loading dataset from: {}", self.path.display());

        match self.format {
            SourceFormat::Json => {
                let content = std::fs::read_to_string(&self.path)?;
                let value: serde_json::Value = serde_json::from_str(&content)?;
                Ok(RawData::Records(value))
            }
            SourceFormat::Csv => {
                let df = CsvReadOptions::default()
                    .with_infer_schema_length(Some(100))
                    .with_has_header(true)
                    .try_into_reader_with_file_path(Some(self.path.clone()))?
                    .finish()?;
                debug!("CSV loaded with shape {:?}", df.shape());
                Ok(RawData::Table(df))
            }
        }
    }

    fn name(&self) -> &str {
        match self.format {
            SourceFormat::Json => "json-file",
            SourceFormat::Csv => "csv-file",
        }
    }
}
