//! Error types for the refining pipeline.
//!
//! Every component fails with its own error kind. The [`DataProcessor`]
//! boundary translates those into a single [`DataProcessingError`], which is
//! the only kind callers of the orchestrator ever observe.
//!
//! The umbrella error is serializable so that it can be emitted as part of a
//! JSON run report.
//!
//! [`DataProcessor`]: crate::pipeline::DataProcessor

use crate::pipeline::PipelineStage;
use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// A dataset is malformed, empty, or cannot be shaped into a table.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// No dataset was supplied, or the raw records do not describe a table.
    #[error("Input is not a table: {0}")]
    NotATable(String),

    /// The dataset has no columns.
    #[error("Dataset has no columns")]
    NoColumns,

    /// The dataset has columns but zero rows.
    #[error("Dataset is empty")]
    Empty,

    /// Column arrays in a record object differ in length.
    #[error("Column '{column}' has {found} values, expected {expected}")]
    RaggedColumns {
        column: String,
        expected: usize,
        found: usize,
    },

    /// A record field holds a value that cannot be stored in a table cell.
    #[error("Unsupported value in column '{column}': {reason}")]
    UnsupportedValue { column: String, reason: String },

    /// The table could not be assembled.
    #[error("Failed to build dataset: {0}")]
    Build(String),
}

/// Normalization, outlier detection and input preprocessing failures.
#[derive(Error, Debug)]
pub enum UtilityError {
    /// The operation was handed an absent dataset.
    #[error("{operation} failed: input must be a table")]
    MissingTable { operation: &'static str },

    /// A column that must be numeric holds another type.
    #[error("{operation} failed: column '{column}' is not numeric ({dtype})")]
    NonNumericColumn {
        operation: &'static str,
        column: String,
        dtype: String,
    },

    /// Outlier threshold must be a finite positive number.
    #[error("Outlier detection failed: invalid threshold {0}")]
    InvalidThreshold(f64),

    /// Model input is neither a record nor a list of numbers.
    #[error("Input preprocessing failed: {0}")]
    UnsupportedInput(String),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

/// Enrichment and transform service failures.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Enrichment could not aggregate the table.
    #[error("Data enrichment failed: {0}")]
    EnrichmentFailed(String),

    /// A column the service depends on is absent.
    #[error("Data transformation failed: required column '{0}' is missing")]
    MissingColumn(String),

    /// Transform could not derive its column.
    #[error("Data transformation failed: {0}")]
    TransformFailed(String),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

/// A data source could not produce raw records.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The source type is not one the source knows how to read.
    #[error("Unsupported source type: {0}")]
    UnsupportedFormat(String),

    /// Generic fetch failure reported by a custom source.
    #[error("Data fetching failed: {0}")]
    FetchFailed(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON decoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Polars error wrapper (CSV reading).
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// HTTP request error (only with the "http" feature).
    #[cfg(feature = "http")]
    #[error("API request failed: {0}")]
    Api(#[from] reqwest::Error),
}

/// Scoring a model failed.
#[derive(Error, Debug)]
pub enum ModelError {
    /// The input could not be turned into a feature vector.
    #[error("Prediction failed: {0}")]
    InvalidInput(#[from] UtilityError),

    /// The feature vector contains NaN values.
    #[error("Prediction failed: input data contains NaN values")]
    ContainsNaN,

    /// The underlying predictor reported an error.
    #[error("Prediction failed: {0}")]
    Predictor(String),
}

/// The failure of one pipeline stage, in its original kind.
#[derive(Error, Debug)]
pub enum StageError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Utility(#[from] UtilityError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Normalization left nothing but missing values.
    #[error("Dataset contains only missing values")]
    AllMissing,
}

impl StageError {
    /// Get error code for report consumers.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Source(_) => "SOURCE_ERROR",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Utility(_) => "UTILITY_ERROR",
            Self::Service(_) => "SERVICE_ERROR",
            Self::AllMissing => "ALL_MISSING",
        }
    }
}

/// Umbrella error returned by the orchestrator.
///
/// Carries the stage that failed and the originating error, whose message is
/// kept intact and reachable through [`std::error::Error::source`].
#[derive(Error, Debug)]
#[error("Data processing failed at {stage}: {source}")]
pub struct DataProcessingError {
    stage: PipelineStage,
    #[source]
    source: StageError,
}

impl DataProcessingError {
    pub fn new(stage: PipelineStage, source: impl Into<StageError>) -> Self {
        Self {
            stage,
            source: source.into(),
        }
    }

    /// The stage at which the run stopped.
    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    /// The originating error.
    pub fn cause(&self) -> &StageError {
        &self.source
    }

    pub fn error_code(&self) -> &'static str {
        self.source.error_code()
    }
}

/// Serialized as `{ code, stage, message }`.
impl Serialize for DataProcessingError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("DataProcessingError", 3)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("stage", &self.stage)?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for orchestrator operations.
pub type Result<T> = std::result::Result<T, DataProcessingError>;
