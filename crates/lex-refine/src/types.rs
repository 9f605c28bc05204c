use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

/// Diagnostics of one successful pipeline run.
///
/// # Example
///
/// ```rust,ignore
/// let result = processor.run()?;
/// let report = &result.report;
/// println!("Dropped {} outlier rows in {}ms", report.rows_dropped, report.duration_ms);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessingReport {
    /// Name of the source the data came from.
    pub source: String,

    /// Number of rows after shaping the fetched data.
    pub rows_fetched: usize,
    /// Number of columns after shaping the fetched data.
    pub columns_fetched: usize,

    /// Missing entries filled by the repair stage.
    pub values_repaired: usize,

    /// Row indices (into the repaired table) flagged as outliers.
    pub outlier_rows: Vec<usize>,
    pub rows_dropped: usize,

    /// Shape of the returned table.
    pub rows_after: usize,
    pub columns_after: usize,

    /// Human-readable log of what each stage did, in order.
    pub steps: Vec<String>,

    /// Total execution time in milliseconds.
    pub duration_ms: u64,
    /// RFC 3339 start time.
    pub started_at: String,
}

impl ProcessingReport {
    pub fn new(source: impl Into<String>, started_at: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            started_at: started_at.into(),
            ..Self::default()
        }
    }

    pub fn add_step(&mut self, step: impl Into<String>) {
        self.steps.push(step.into());
    }

    /// Percentage of fetched rows removed as outliers.
    pub fn rows_dropped_percentage(&self) -> f64 {
        if self.rows_fetched == 0 {
            0.0
        } else {
            (self.rows_dropped as f64 / self.rows_fetched as f64) * 100.0
        }
    }
}

/// Output of [`DataProcessor::run`](crate::DataProcessor::run).
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// The cleaned, enriched and transformed table.
    pub data: DataFrame,
    pub report: ProcessingReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_dropped_percentage() {
        let mut report = ProcessingReport::new("static", "2024-01-01T00:00:00+00:00");
        assert_eq!(report.rows_dropped_percentage(), 0.0);

        report.rows_fetched = 8;
        report.rows_dropped = 2;
        assert_eq!(report.rows_dropped_percentage(), 25.0);
    }

    #[test]
    fn test_report_serialization() {
        let mut report = ProcessingReport::new("csv-file", "2024-01-01T00:00:00+00:00");
        report.outlier_rows = vec![6];
        report.add_step("Dropped 1 outlier rows");

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["source"], "csv-file");
        assert_eq!(json["outlier_rows"][0], 6);
        assert_eq!(json["steps"][0], "Dropped 1 outlier rows");

        let back: ProcessingReport = serde_json::from_value(json).unwrap();
        assert_eq!(back, report);
    }
}
