//! Progress reporting for the refining pipeline.
//!
//! The pipeline does not rely on any global logging state to surface what it
//! is doing. Callers that care pass a [`ProgressReporter`] to the processor
//! and receive one [`ProgressUpdate`] per stage transition.
//!
//! # Example
//!
//! ```rust,ignore
//! use lex_refine::DataProcessor;
//!
//! let processor = DataProcessor::builder()
//!     .source(source)
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?;
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stages of a pipeline run, in execution order.
///
/// `Complete` and `Failed` are the terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Pulling raw records from the data source
    Fetch,
    /// Shaping records into a table and checking it is non-empty
    Validate,
    /// Rescaling columns to zero mean and unit variance
    Normalize,
    /// Rejecting tables that normalized to nothing but missing values
    AllMissingCheck,
    /// Forward/backward filling missing values
    Repair,
    /// Flagging rows with a robust z-score above the threshold
    DetectOutliers,
    /// Removing flagged rows
    DropOutliers,
    /// Running the enrichment service
    Enrich,
    /// Running the transform service
    Transform,
    /// Run completed successfully
    Complete,
    /// Run stopped with an error
    Failed,
}

impl PipelineStage {
    /// The working stages, in the order the processor runs them.
    pub const ORDER: [PipelineStage; 9] = [
        Self::Fetch,
        Self::Validate,
        Self::Normalize,
        Self::AllMissingCheck,
        Self::Repair,
        Self::DetectOutliers,
        Self::DropOutliers,
        Self::Enrich,
        Self::Transform,
    ];

    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Fetch => "Fetch",
            Self::Validate => "Validate",
            Self::Normalize => "Normalize",
            Self::AllMissingCheck => "All-missing check",
            Self::Repair => "Repair",
            Self::DetectOutliers => "Detect outliers",
            Self::DropOutliers => "Drop outliers",
            Self::Enrich => "Enrich",
            Self::Transform => "Transform",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Whether the run ends in this stage.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }

    /// Fraction of the run finished when this stage starts.
    ///
    /// Every working stage carries the same weight; terminal states report
    /// 1.0 for completion and 0.0 for failure.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Complete => 1.0,
            Self::Failed => 0.0,
            stage => {
                let index = Self::ORDER
                    .iter()
                    .position(|s| s == stage)
                    .unwrap_or_default();
                index as f32 / Self::ORDER.len() as f32
            }
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A single progress event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Stage the run just entered
    pub stage: PipelineStage,

    /// Overall progress (0.0 - 1.0)
    pub progress: f32,

    /// Human-readable message describing current activity
    pub message: String,
}

impl ProgressUpdate {
    /// Creates an update announcing the start of a stage.
    pub fn new(stage: PipelineStage, message: impl Into<String>) -> Self {
        Self {
            stage,
            progress: stage.base_progress().clamp(0.0, 1.0),
            message: message.into(),
        }
    }

    /// Creates a completion progress update.
    pub fn complete(message: impl Into<String>) -> Self {
        Self::new(PipelineStage::Complete, message)
    }

    /// Creates a failed progress update.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::new(PipelineStage::Failed, message)
    }
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);

/// Receives progress updates from a pipeline run.
///
/// Implementations must be `Send + Sync` so that a processor holding one can
/// be moved to a worker thread.
pub trait ProgressReporter: Send + Sync {
    /// Called once per stage transition. Keep it cheap.
    fn report(&self, update: ProgressUpdate);
}

/// Wrapper that implements [`ProgressReporter`] using a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    /// Creates a new closure-based progress reporter.
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}
