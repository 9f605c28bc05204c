//! The pipeline orchestrator.
//!
//! [`DataProcessor`] runs every stage in a fixed order and stops at the first
//! failure. Each stage fails with its own error kind, and the processor
//! translates it into a [`DataProcessingError`] tagged with the stage.

use crate::cleaner::{is_entirely_missing, normalize_with_ddof, repair_missing, validate};
use crate::config::{ConfigValidationError, PipelineConfig};
use crate::error::{DataProcessingError, Result, StageError};
use crate::pipeline::outliers::{OutlierDetector, drop_rows};
use crate::pipeline::progress::{
    ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate,
};
use crate::services::{Enricher, RowSumEnricher, ScalingTransformer, Transformer};
use crate::sources::DataSource;
use crate::types::{PipelineResult, ProcessingReport};
use crate::utils::total_null_count;
use chrono::Local;
use polars::prelude::DataFrame;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Fetches, cleans, enriches and transforms one dataset per run.
///
/// Use [`DataProcessor::builder()`] to swap services or attach a progress
/// reporter, or [`DataProcessor::new`] for the built-in services.
///
/// # Example
///
/// ```rust,ignore
/// use lex_refine::{DataProcessor, PipelineConfig};
/// use lex_refine::sources::FileDataSource;
/// use std::sync::Arc;
///
/// let processor = DataProcessor::builder()
///     .source(Arc::new(FileDataSource::from_path("readings.csv")?))
///     .config(PipelineConfig::builder().outlier_threshold(3.0).build()?)
///     .on_progress(|update| println!("{}", update.message))
///     .build()?;
///
/// let table = processor.process()?;
/// ```
pub struct DataProcessor {
    config: PipelineConfig,
    source: Arc<dyn DataSource>,
    enricher: Arc<dyn Enricher>,
    transformer: Arc<dyn Transformer>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

// A processor is moved to worker threads and reused across runs
static_assertions::assert_impl_all!(DataProcessor: Send, Sync);

impl DataProcessor {
    /// Processor with the default config and the built-in services.
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self {
            config: PipelineConfig::default(),
            source,
            enricher: Arc::new(RowSumEnricher),
            transformer: Arc::new(ScalingTransformer::default()),
            progress_reporter: None,
        }
    }

    pub fn builder() -> DataProcessorBuilder {
        DataProcessorBuilder::default()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline and return the transformed table.
    pub fn process(&self) -> Result<DataFrame> {
        self.run().map(|result| result.data)
    }

    /// Run the pipeline and return the transformed table with a run report.
    ///
    /// # Errors
    ///
    /// Any stage failure stops the run. The returned [`DataProcessingError`]
    /// names the stage and keeps the originating error as its source.
    pub fn run(&self) -> Result<PipelineResult> {
        match self.run_internal() {
            Ok(result) => {
                self.report_progress(ProgressUpdate::complete(
                    "Data processing completed successfully",
                ));
                Ok(result)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("{}", e);
                Err(e)
            }
        }
    }

    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    /// Announce a stage, run it, and translate its failure.
    fn stage<T, E>(
        &self,
        stage: PipelineStage,
        message: &str,
        f: impl FnOnce() -> std::result::Result<T, E>,
    ) -> Result<T>
    where
        E: Into<StageError>,
    {
        info!("{}", message);
        self.report_progress(ProgressUpdate::new(stage, message));
        f().map_err(|e| DataProcessingError::new(stage, e))
    }

    fn run_internal(&self) -> Result<PipelineResult> {
        let start_time = Instant::now();
        let mut report = ProcessingReport::new(self.source.name(), Local::now().to_rfc3339());

        info!(
            "Starting data processing pipeline (source: {})",
            self.source.name()
        );

        let raw = self.stage(PipelineStage::Fetch, "Fetching data...", || {
            self.source.fetch()
        })?;
        report.add_step(format!("Fetched data from {} source", self.source.name()));

        let df = self.stage(PipelineStage::Validate, "Validating dataset...", || {
            let df = raw.into_dataset()?;
            validate(&df)?;
            Ok::<_, crate::error::ValidationError>(df)
        })?;
        report.rows_fetched = df.height();
        report.columns_fetched = df.width();
        report.add_step(format!(
            "Validated dataset with {} rows and {} columns",
            df.height(),
            df.width()
        ));

        let df = self.stage(PipelineStage::Normalize, "Normalizing data...", || {
            normalize_with_ddof(&df, self.config.std_ddof)
        })?;
        report.add_step(format!(
            "Normalized {} columns (ddof = {})",
            df.width(),
            self.config.std_ddof
        ));

        self.stage(
            PipelineStage::AllMissingCheck,
            "Checking for all-missing data...",
            || {
                if is_entirely_missing(&df) {
                    Err(StageError::AllMissing)
                } else {
                    Ok(())
                }
            },
        )?;

        let missing_before = total_null_count(&df);
        let df = self.stage(PipelineStage::Repair, "Repairing missing values...", || {
            repair_missing(&df)
        })?;
        report.values_repaired = missing_before.saturating_sub(total_null_count(&df));
        if report.values_repaired > 0 {
            report.add_step(format!(
                "Filled {} missing values (forward, then backward)",
                report.values_repaired
            ));
        }

        let outliers = self.stage(
            PipelineStage::DetectOutliers,
            "Detecting outliers...",
            || {
                OutlierDetector::new(self.config.outlier_threshold)
                    .and_then(|detector| detector.detect(&df))
            },
        )?;
        report.outlier_rows = outliers.iter().copied().collect();
        debug!("Outlier rows: {:?}", report.outlier_rows);

        let rows_before = df.height();
        let df = self.stage(PipelineStage::DropOutliers, "Dropping outliers...", || {
            drop_rows(&df, &outliers)
        })?;
        report.rows_dropped = rows_before - df.height();
        report.add_step(format!(
            "Dropped {} outlier rows (threshold {})",
            report.rows_dropped, self.config.outlier_threshold
        ));

        let df = self.stage(PipelineStage::Enrich, "Enriching data...", || {
            self.enricher.enrich(&df)
        })?;
        report.add_step(format!("Enriched data with {}", self.enricher.name()));

        let df = self.stage(PipelineStage::Transform, "Transforming data...", || {
            self.transformer.transform(&df)
        })?;
        report.add_step(format!("Transformed data with {}", self.transformer.name()));

        report.rows_after = df.height();
        report.columns_after = df.width();
        report.duration_ms = start_time.elapsed().as_millis() as u64;

        info!(
            "Data processing completed: {:?} in {}ms",
            df.shape(),
            report.duration_ms
        );

        Ok(PipelineResult { data: df, report })
    }
}

/// Builder for [`DataProcessor`].
#[derive(Default)]
pub struct DataProcessorBuilder {
    config: Option<PipelineConfig>,
    source: Option<Arc<dyn DataSource>>,
    enricher: Option<Arc<dyn Enricher>>,
    transformer: Option<Arc<dyn Transformer>>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(DataProcessorBuilder: Send);

impl DataProcessorBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the data source. Required.
    pub fn source(mut self, source: Arc<dyn DataSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Replace the built-in [`RowSumEnricher`].
    pub fn enricher(mut self, enricher: Arc<dyn Enricher>) -> Self {
        self.enricher = Some(enricher);
        self
    }

    /// Replace the built-in [`ScalingTransformer`].
    pub fn transformer(mut self, transformer: Arc<dyn Transformer>) -> Self {
        self.transformer = Some(transformer);
        self
    }

    /// Set a progress reporter for receiving updates during processing.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// Convenience over [`progress_reporter`](Self::progress_reporter).
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the processor.
    ///
    /// Returns an error if no source was set or the configuration is invalid.
    pub fn build(self) -> std::result::Result<DataProcessor, ConfigValidationError> {
        let source = self.source.ok_or(ConfigValidationError::MissingSource)?;
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(DataProcessor {
            config,
            source,
            enricher: self.enricher.unwrap_or_else(|| Arc::new(RowSumEnricher)),
            transformer: self
                .transformer
                .unwrap_or_else(|| Arc::new(ScalingTransformer::default())),
            progress_reporter: self.progress_reporter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ServiceError, SourceError, UtilityError};
    use crate::services::{ENRICHED_COLUMN, TRANSFORMED_COLUMN};
    use crate::sources::{RawData, StaticSource};
    use polars::prelude::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Mutex;

    struct FailingSource;

    impl DataSource for FailingSource {
        fn fetch(&self) -> std::result::Result<RawData, SourceError> {
            Err(SourceError::FetchFailed("connection reset".to_string()))
        }
    }

    struct MockEnricher;

    impl Enricher for MockEnricher {
        fn enrich(&self, df: &DataFrame) -> std::result::Result<DataFrame, ServiceError> {
            let mut out = df.clone();
            out.with_column(Series::new(
                ENRICHED_COLUMN.into(),
                vec![1.0_f64; df.height()],
            ))?;
            Ok(out)
        }
    }

    struct MockTransformer;

    impl Transformer for MockTransformer {
        fn transform(&self, df: &DataFrame) -> std::result::Result<DataFrame, ServiceError> {
            let mut out = df.clone();
            out.with_column(Series::new(
                TRANSFORMED_COLUMN.into(),
                vec![2.0_f64; df.height()],
            ))?;
            Ok(out)
        }
    }

    struct PassThrough;

    impl Enricher for PassThrough {
        fn enrich(&self, df: &DataFrame) -> std::result::Result<DataFrame, ServiceError> {
            Ok(df.clone())
        }
    }

    fn static_source(value: serde_json::Value) -> Arc<dyn DataSource> {
        Arc::new(StaticSource::new(value))
    }

    /// Build a processor that records every stage it reports.
    fn recording_processor(
        source: Arc<dyn DataSource>,
    ) -> (DataProcessor, Arc<Mutex<Vec<PipelineStage>>>) {
        let stages = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&stages);
        let processor = DataProcessor::builder()
            .source(source)
            .on_progress(move |update| sink.lock().unwrap().push(update.stage))
            .build()
            .unwrap();
        (processor, stages)
    }

    #[test]
    fn test_process_data_success() {
        let processor = DataProcessor::builder()
            .source(static_source(json!({"col1": [1, 2], "col2": [3, 4]})))
            .enricher(Arc::new(MockEnricher))
            .transformer(Arc::new(MockTransformer))
            .build()
            .unwrap();

        let result = processor.process().unwrap();
        assert!(result.column(TRANSFORMED_COLUMN).is_ok());
        assert_eq!(result.height(), 2);
    }

    #[test]
    fn test_process_data_fetch_failure() {
        let processor = DataProcessor::new(Arc::new(FailingSource));
        let err = processor.process().unwrap_err();

        assert_eq!(err.stage(), PipelineStage::Fetch);
        assert_eq!(err.error_code(), "SOURCE_ERROR");
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn test_single_row_fails_before_repair() {
        let (processor, stages) = recording_processor(static_source(json!({"value": 0.42})));

        let err = processor.process().unwrap_err();
        assert_eq!(err.stage(), PipelineStage::AllMissingCheck);
        assert!(matches!(err.cause(), StageError::AllMissing));
        assert_eq!(
            *stages.lock().unwrap(),
            vec![
                PipelineStage::Fetch,
                PipelineStage::Validate,
                PipelineStage::Normalize,
                PipelineStage::AllMissingCheck,
                PipelineStage::Failed,
            ]
        );
    }

    #[test]
    fn test_all_missing_input_fails() {
        let processor = DataProcessor::new(static_source(json!({
            "col1": [null, null],
            "col2": [null, null],
        })));
        let err = processor.process().unwrap_err();
        assert_eq!(err.error_code(), "ALL_MISSING");
    }

    #[test]
    fn test_empty_input_fails_validation() {
        let processor = DataProcessor::new(static_source(json!([])));
        let err = processor.process().unwrap_err();
        assert_eq!(err.stage(), PipelineStage::Validate);
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_non_numeric_column_fails_normalization() {
        let processor = DataProcessor::new(static_source(json!({
            "value": [1.0, 2.0, 3.0],
            "label": ["a", "b", "c"],
        })));
        let err = processor.process().unwrap_err();
        assert_eq!(err.stage(), PipelineStage::Normalize);
        assert!(matches!(
            err.cause(),
            StageError::Utility(UtilityError::NonNumericColumn { .. })
        ));
    }

    #[test]
    fn test_missing_enriched_column_fails_transform() {
        let processor = DataProcessor::builder()
            .source(static_source(json!({"col1": [1, 2], "col2": [3, 5]})))
            .enricher(Arc::new(PassThrough))
            .build()
            .unwrap();

        let err = processor.process().unwrap_err();
        assert_eq!(err.stage(), PipelineStage::Transform);
        assert!(err.to_string().contains("required column 'enriched' is missing"));
    }

    #[test]
    fn test_run_reports_every_stage_in_order() {
        let (processor, stages) = recording_processor(static_source(json!({
            "a": [1.0, 2.0, 3.0, 4.0],
            "b": [2.0, 1.0, 4.0, 3.0],
        })));

        let result = processor.run().unwrap();
        let mut expected = PipelineStage::ORDER.to_vec();
        expected.push(PipelineStage::Complete);
        assert_eq!(*stages.lock().unwrap(), expected);

        let report = &result.report;
        assert_eq!(report.source, "static");
        assert_eq!((report.rows_fetched, report.columns_fetched), (4, 2));
        assert_eq!(report.rows_dropped, 0);
        assert_eq!((report.rows_after, report.columns_after), (4, 4));
        assert!(!report.steps.is_empty());
    }

    #[test]
    fn test_outlier_rows_are_dropped_before_enrichment() {
        let processor = DataProcessor::new(static_source(json!({
            "value": [10.0, 11.0, 9.5, 10.2, 10.8, 9.9, 250.0, 10.1],
        })));

        let result = processor.run().unwrap();
        assert_eq!(result.report.outlier_rows, vec![6]);
        assert_eq!(result.report.rows_dropped, 1);
        assert_eq!(result.data.height(), 7);
    }

    #[test]
    fn test_processor_is_reusable() {
        let processor = DataProcessor::new(static_source(json!({"x": [1, 2, 3], "y": [3, 1, 2]})));
        let first = processor.process().unwrap();
        let second = processor.process().unwrap();
        assert!(first.equals_missing(&second));
    }

    #[test]
    fn test_builder_requires_source() {
        assert!(matches!(
            DataProcessor::builder().build(),
            Err(ConfigValidationError::MissingSource)
        ));
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        let config = PipelineConfig {
            outlier_threshold: -1.0,
            ..PipelineConfig::default()
        };
        let result = DataProcessor::builder()
            .source(static_source(json!({"x": [1]})))
            .config(config)
            .build();
        assert!(matches!(
            result,
            Err(ConfigValidationError::InvalidThreshold { .. })
        ));
    }
}
