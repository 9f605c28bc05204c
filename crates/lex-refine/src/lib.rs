//! Data Refining Pipeline Library
//!
//! Fetches a dataset, cleans it and hands it through pluggable enrichment and
//! transform services, built with Rust and Polars.
//!
//! # Overview
//!
//! A run goes through these stages, in order:
//!
//! 1. **Fetch**: a [`DataSource`] returns raw records or a table
//! 2. **Validate**: records are shaped into a table that must have columns and rows
//! 3. **Normalize**: every column is rescaled to zero mean and unit variance
//! 4. **All-missing check**: a table with nothing left but missing values is rejected
//! 5. **Repair**: remaining gaps are filled forward, then backward
//! 6. **Detect/drop outliers**: rows with a modified z-score above the threshold
//!    in any numeric column are removed
//! 7. **Enrich / Transform**: the injected [`Enricher`] and [`Transformer`] run
//!
//! Any failure stops the run with a single [`DataProcessingError`] that names
//! the stage and keeps the original error as its source.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use lex_refine::{DataProcessor, PipelineConfig};
//! use lex_refine::sources::StaticSource;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let source = Arc::new(StaticSource::new(json!({
//!     "temperature": [20.1, 20.3, 19.8, 55.0, 20.0],
//!     "humidity": [40, 42, 41, 40, 39],
//! })));
//!
//! let result = DataProcessor::builder()
//!     .source(source)
//!     .config(PipelineConfig::builder().outlier_threshold(3.5).build()?)
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run()?;
//!
//! println!("{}", result.data);
//! println!("Dropped rows: {:?}", result.report.outlier_rows);
//! ```
//!
//! # Standalone operations
//!
//! The cleaning stages are plain functions and can be used without the
//! orchestrator:
//!
//! ```rust,ignore
//! use lex_refine::{detect_outliers, normalize_data};
//!
//! let normalized = normalize_data(&df)?;
//! let outliers = detect_outliers(&df, 3.5)?;
//! ```

pub mod cleaner;
pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod services;
pub mod sources;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::{
    TableRef, dataset_from_records, is_entirely_missing, normalize_data, normalize_with_ddof,
    repair_missing, validate,
};
pub use config::{ConfigValidationError, PipelineConfig, PipelineConfigBuilder, Settings};
pub use error::{
    DataProcessingError, ModelError, Result as ProcessingResult, ServiceError, SourceError,
    StageError, UtilityError, ValidationError,
};
pub use model::{Model, Predictor, preprocess_input};
pub use pipeline::{
    ClosureProgressReporter, ColumnStatistics, DataProcessor, DataProcessorBuilder,
    OutlierDetector, PipelineStage, ProgressReporter, ProgressUpdate, detect_outliers, drop_rows,
};
pub use services::{Enricher, RowSumEnricher, ScalingTransformer, Transformer};
pub use sources::{DataSource, FileDataSource, RawData, SourceFormat, StaticSource};
#[cfg(feature = "http")]
pub use sources::{ApiClient, ApiDataSource};
pub use types::{PipelineResult, ProcessingReport};
