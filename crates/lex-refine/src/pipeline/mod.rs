//! Pipeline module.
//!
//! This module provides the orchestrator and the stages that are specific to
//! it: outlier detection and progress reporting.

pub mod outliers;
mod processor;
pub mod progress;

pub use outliers::{ColumnStatistics, OutlierDetector, detect_outliers, drop_rows};
pub use processor::{DataProcessor, DataProcessorBuilder};
pub use progress::{ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate};
