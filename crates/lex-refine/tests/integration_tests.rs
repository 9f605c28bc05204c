//! Integration tests for the data refining pipeline.
//!
//! These tests run the full pipeline over the file fixtures and check the
//! standalone cleaning operations against the same data.

use lex_refine::{
    DataProcessingError, DataProcessor, DataSource, FileDataSource, PipelineConfig, PipelineStage,
    ProgressUpdate, SourceFormat, StageError, UtilityError, detect_outliers, normalize_data,
};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use pretty_assertions::assert_eq;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_csv(filename: &str) -> DataFrame {
    let path = fixtures_path().join(filename);
    CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path))
        .expect("Failed to create CSV reader")
        .finish()
        .expect("Failed to read CSV file")
}

fn fixture_source(filename: &str) -> Arc<dyn DataSource> {
    Arc::new(
        FileDataSource::from_path(fixtures_path().join(filename))
            .expect("fixture has a known extension"),
    )
}

fn f64_values(df: &DataFrame, column: &str) -> Vec<f64> {
    df.column(column)
        .unwrap()
        .as_materialized_series()
        .cast(&DataType::Float64)
        .unwrap()
        .f64()
        .unwrap()
        .into_no_null_iter()
        .collect()
}

fn run_fixture(filename: &str) -> Result<lex_refine::PipelineResult, DataProcessingError> {
    DataProcessor::new(fixture_source(filename)).run()
}

// ============================================================================
// Full Pipeline Tests
// ============================================================================

#[test]
fn test_full_pipeline_readings_csv() {
    let result = run_fixture("readings.csv").expect("pipeline should succeed");

    assert_eq!(result.report.source, "csv-file");
    assert_eq!(result.report.rows_fetched, 8);
    assert_eq!(result.report.outlier_rows, vec![6]);
    assert_eq!(result.report.rows_dropped, 1);
    assert_eq!(result.data.shape(), (7, 4));

    let names: Vec<String> = result
        .data
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    assert_eq!(names, vec!["temperature", "humidity", "enriched", "transformed"]);

    let enriched = f64_values(&result.data, "enriched");
    let transformed = f64_values(&result.data, "transformed");
    for (e, t) in enriched.iter().zip(&transformed) {
        assert!((t - 2.0 * e).abs() < 1e-12, "transformed must be 2 * enriched");
    }
}

#[test]
fn test_gaps_are_repaired() {
    let result = run_fixture("gaps.csv").expect("pipeline should succeed");

    assert_eq!(result.report.values_repaired, 2);
    assert!(result.report.outlier_rows.is_empty());
    assert_eq!(result.data.height(), 5);
    for column in result.data.get_columns() {
        assert_eq!(column.null_count(), 0, "column '{}' has gaps", column.name());
    }
}

#[test]
fn test_json_records_source() {
    let result = run_fixture("records.json").expect("pipeline should succeed");

    assert_eq!(result.report.source, "json-file");
    assert_eq!((result.report.rows_fetched, result.report.columns_fetched), (4, 2));
    assert_eq!(result.report.values_repaired, 1);
    assert_eq!(result.data.height(), 4);
}

#[test]
fn test_empty_csv_column_is_carried_as_missing() {
    let result = run_fixture("empty_column.csv").expect("pipeline should succeed");

    assert_eq!(result.data.height(), 4);
    let empty = result.data.column("b").unwrap();
    assert_eq!(empty.dtype(), &DataType::Float64);
    assert_eq!(empty.null_count(), 4);

    let enriched = f64_values(&result.data, "enriched");
    let normalized = f64_values(&result.data, "a");
    assert_eq!(enriched, normalized, "missing cells add nothing to the row sum");
}

#[test]
fn test_single_record_fails_before_repair() {
    let err = run_fixture("single_row.json").unwrap_err();

    assert_eq!(err.stage(), PipelineStage::AllMissingCheck);
    assert!(matches!(err.cause(), StageError::AllMissing));
    assert!(err.to_string().contains("only missing values"));
}

#[test]
fn test_text_column_fails_normalization() {
    let err = run_fixture("labels.csv").unwrap_err();

    assert_eq!(err.stage(), PipelineStage::Normalize);
    assert!(matches!(
        err.cause(),
        StageError::Utility(UtilityError::NonNumericColumn { column, .. }) if column == "label"
    ));
}

#[test]
fn test_missing_file_fails_at_fetch() {
    let source = FileDataSource::new(fixtures_path().join("missing.json"), SourceFormat::Json);
    let err = DataProcessor::new(Arc::new(source)).process().unwrap_err();

    assert_eq!(err.stage(), PipelineStage::Fetch);
    assert_eq!(err.error_code(), "SOURCE_ERROR");

    let json = serde_json::to_value(&err).unwrap();
    assert_eq!(json["code"], "SOURCE_ERROR");
    assert_eq!(json["stage"], "fetch");
}

// ============================================================================
// Configuration and Progress Tests
// ============================================================================

#[test]
fn test_lower_threshold_flags_more_rows() {
    let config = PipelineConfig::builder()
        .outlier_threshold(1.3)
        .build()
        .unwrap();
    let result = DataProcessor::builder()
        .source(fixture_source("readings.csv"))
        .config(config)
        .build()
        .unwrap()
        .run()
        .unwrap();

    assert!(result.report.outlier_rows.contains(&6));
    assert!(result.report.outlier_rows.len() > 1);
    assert_eq!(result.data.height(), 8 - result.report.outlier_rows.len());
}

#[test]
fn test_progress_reporting() {
    let update_count = Arc::new(AtomicUsize::new(0));
    let count_clone = Arc::clone(&update_count);
    let last_stage = Arc::new(std::sync::Mutex::new(None));
    let stage_clone = Arc::clone(&last_stage);

    let result = DataProcessor::builder()
        .source(fixture_source("readings.csv"))
        .on_progress(move |update: ProgressUpdate| {
            count_clone.fetch_add(1, Ordering::SeqCst);
            *stage_clone.lock().unwrap() = Some(update.stage);
        })
        .build()
        .unwrap()
        .run();

    assert!(result.is_ok());
    // One update per working stage, plus completion
    assert_eq!(
        update_count.load(Ordering::SeqCst),
        PipelineStage::ORDER.len() + 1
    );
    assert_eq!(*last_stage.lock().unwrap(), Some(PipelineStage::Complete));
}

#[test]
fn test_processor_runs_on_another_thread() {
    let processor = DataProcessor::new(fixture_source("readings.csv"));

    let handle = std::thread::spawn(move || processor.process().map(|df| df.height()));
    let rows = handle.join().expect("worker thread panicked").unwrap();
    assert_eq!(rows, 7);
}

// ============================================================================
// Standalone Operation Tests
// ============================================================================

#[test]
fn test_detect_outliers_on_raw_fixture() {
    let df = load_csv("readings.csv");
    let outliers = detect_outliers(&df, 3.5).unwrap();
    assert_eq!(outliers, BTreeSet::from([6]));
}

#[test]
fn test_detection_unchanged_by_normalization() {
    let df = load_csv("readings.csv");
    let normalized = normalize_data(&df).unwrap();

    assert_eq!(
        detect_outliers(&normalized, 3.5).unwrap(),
        detect_outliers(&df, 3.5).unwrap()
    );
}

#[test]
fn test_normalized_columns_have_zero_mean() {
    let df = load_csv("readings.csv");
    let normalized = normalize_data(&df).unwrap();

    for name in ["temperature", "humidity"] {
        let values = f64_values(&normalized, name);
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        assert!(mean.abs() < 1e-9, "mean of '{}' is {}", name, mean);
    }
}
