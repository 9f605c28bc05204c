//! Outlier detection and removal.
//!
//! Outliers are flagged with the modified z-score, a median/MAD based
//! statistic that is not dragged around by the outliers it is looking for:
//!
//! ```text
//! median = median(c)
//! mad    = median(|c - median|)
//! z      = 0.6745 * (c - median) / mad
//! ```
//!
//! A row is an outlier when `|z|` exceeds the threshold in *any* numeric
//! column.

use crate::cleaner::TableRef;
use crate::config::DEFAULT_OUTLIER_THRESHOLD;
use crate::error::UtilityError;
use crate::utils::{column_values, numeric_column_names};
use polars::prelude::*;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Scales MAD to be consistent with the standard deviation of a normal
/// distribution (`1 / 0.6745` is its 75th percentile).
pub const MODIFIED_Z_SCALE: f64 = 0.6745;

/// Robust statistics of one numeric column, computed fresh on every call.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStatistics {
    pub column: String,
    pub median: f64,
    /// Median absolute deviation, after the zero floor was applied.
    pub mad: f64,
    /// Whether the raw MAD was zero and replaced with `f64::EPSILON`.
    pub mad_floored: bool,
}

impl ColumnStatistics {
    /// Compute median and MAD over the present values of a column.
    ///
    /// Returns `None` when the column has no present values.
    pub fn from_values(column: impl Into<String>, values: &[Option<f64>]) -> Option<Self> {
        let values: Float64Chunked = values.iter().copied().collect();
        let median = values.median()?;

        let deviations: Float64Chunked = values
            .into_iter()
            .map(|v| v.map(|x| (x - median).abs()))
            .collect();
        let raw_mad = deviations.median()?;
        let mad_floored = raw_mad == 0.0;

        Some(Self {
            column: column.into(),
            median,
            mad: if mad_floored { f64::EPSILON } else { raw_mad },
            mad_floored,
        })
    }

    /// Modified z-score of a single value.
    pub fn modified_z(&self, value: f64) -> f64 {
        MODIFIED_Z_SCALE * (value - self.median) / self.mad
    }
}

/// Flags outlier rows with the modified z-score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlierDetector {
    threshold: f64,
}

impl Default for OutlierDetector {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_OUTLIER_THRESHOLD,
        }
    }
}

impl OutlierDetector {
    pub fn new(threshold: f64) -> Result<Self, UtilityError> {
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(UtilityError::InvalidThreshold(threshold));
        }
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Row indices (0-based) flagged in any numeric column.
    ///
    /// Non-numeric columns are ignored; a table without numeric columns has
    /// no outliers. Missing entries are left out of the statistics and are
    /// never flagged.
    ///
    /// When a column's MAD is zero (more than half of its values are equal)
    /// the MAD is replaced with `f64::EPSILON`. Values equal to the median
    /// then score 0, and every other value scores astronomically high and is
    /// flagged, however small its actual deviation.
    pub fn detect<'a>(
        &self,
        input: impl Into<TableRef<'a>>,
    ) -> Result<BTreeSet<usize>, UtilityError> {
        let df = input.into().get().ok_or(UtilityError::MissingTable {
            operation: "Outlier detection",
        })?;

        info!(
            "Starting outlier detection for dataset of shape {:?} (threshold {})",
            df.shape(),
            self.threshold
        );

        let numeric = numeric_column_names(df);
        if numeric.is_empty() {
            warn!("No numeric columns found in dataset.");
            return Ok(BTreeSet::new());
        }

        let mut outliers = BTreeSet::new();
        for name in &numeric {
            let column = df.column(name)?;
            let values = column_values(column)?;
            let Some(stats) = ColumnStatistics::from_values(column.name().as_str(), &values)
            else {
                debug!("Column '{}' has no present values, skipped", column.name());
                continue;
            };

            if stats.mad_floored {
                warn!(
                    "Column '{}' has zero MAD, using machine epsilon",
                    stats.column
                );
            }
            debug!(
                "Column: {}, Median: {}, MAD: {}",
                stats.column, stats.median, stats.mad
            );

            let flagged: Vec<usize> = values
                .iter()
                .enumerate()
                .filter_map(|(row, value)| {
                    value
                        .filter(|x| stats.modified_z(*x).abs() > self.threshold)
                        .map(|_| row)
                })
                .collect();

            if !flagged.is_empty() {
                debug!("Outliers detected in column '{}': {:?}", stats.column, flagged);
            }
            outliers.extend(flagged);
        }

        info!("Total unique outliers detected: {:?}", outliers);
        Ok(outliers)
    }
}

/// Row indices of outliers, see [`OutlierDetector::detect`].
///
/// [`DEFAULT_OUTLIER_THRESHOLD`] (3.5) is the conventional threshold.
pub fn detect_outliers<'a>(
    input: impl Into<TableRef<'a>>,
    threshold: f64,
) -> Result<BTreeSet<usize>, UtilityError> {
    OutlierDetector::new(threshold)?.detect(input)
}

/// Remove the given rows, keeping the order of the others.
///
/// Indices past the end of the table are ignored.
pub fn drop_rows(df: &DataFrame, rows: &BTreeSet<usize>) -> Result<DataFrame, UtilityError> {
    if rows.is_empty() {
        return Ok(df.clone());
    }

    let mask_values: Vec<bool> = (0..df.height()).map(|row| !rows.contains(&row)).collect();
    let mask = BooleanChunked::from_slice("mask".into(), &mask_values);
    let kept = df.filter(&mask)?;

    debug!("Removed {} outlier rows", df.height() - kept.height());
    Ok(kept)
}
