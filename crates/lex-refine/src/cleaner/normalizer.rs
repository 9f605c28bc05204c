//! Z-score normalization.

use super::TableRef;
use crate::config::DEFAULT_STD_DDOF;
use crate::error::UtilityError;
use crate::utils::{column_values, is_numeric_dtype};
use polars::prelude::*;
use tracing::{debug, info, warn};

const OPERATION: &str = "Data normalization";

/// Rescale every column to zero mean and unit variance.
///
/// Uses the sample standard deviation. See [`normalize_with_ddof`].
pub fn normalize_data<'a>(input: impl Into<TableRef<'a>>) -> Result<DataFrame, UtilityError> {
    normalize_with_ddof(input, DEFAULT_STD_DDOF)
}

/// Rescale every column as `(v - mean) / std`, with `std` computed using
/// `ddof` delta degrees of freedom.
///
/// Missing entries are skipped by the statistics and stay missing. A column
/// whose standard deviation is zero or undefined (fewer than `ddof + 1`
/// present values) comes out entirely missing; the pipeline decides what to
/// do about that. Every column must be numeric.
///
/// Returns a new DataFrame; the input is left untouched. This is a one-shot
/// transform: running it again only reproduces the same table when the first
/// pass already produced mean 0 and std 1.
pub fn normalize_with_ddof<'a>(
    input: impl Into<TableRef<'a>>,
    ddof: u8,
) -> Result<DataFrame, UtilityError> {
    let df = input
        .into()
        .get()
        .ok_or(UtilityError::MissingTable {
            operation: OPERATION,
        })?;

    info!("Starting normalization for dataset of shape {:?}", df.shape());

    let columns = df
        .get_columns()
        .iter()
        .map(|column| normalize_column(column, ddof))
        .collect::<Result<Vec<_>, _>>()?;

    let normalized = DataFrame::new(columns)?;
    debug!(
        "Normalization successful, {} missing values in result",
        normalized
            .get_columns()
            .iter()
            .map(|c| c.null_count())
            .sum::<usize>()
    );
    Ok(normalized)
}

fn normalize_column(column: &Column, ddof: u8) -> Result<Column, UtilityError> {
    if !is_numeric_dtype(column.dtype()) {
        return Err(UtilityError::NonNumericColumn {
            operation: OPERATION,
            column: column.name().to_string(),
            dtype: column.dtype().to_string(),
        });
    }

    let values: Float64Chunked = column_values(column)?.into_iter().collect();
    let present = values.len() - values.null_count();
    let mean = values.mean();
    // std is undefined with ddof or fewer present values
    let std = if present > usize::from(ddof) {
        values.std(ddof)
    } else {
        None
    };

    let scaled: Vec<Option<f64>> = match (mean, std) {
        (Some(mean), Some(std)) if std > 0.0 => values
            .into_iter()
            .map(|v| v.map(|x| (x - mean) / std).filter(|z| z.is_finite()))
            .collect(),
        _ => {
            warn!(
                "Column '{}' has no spread (mean: {:?}, std: {:?}); values are undefined",
                column.name(),
                mean,
                std
            );
            vec![None; values.len()]
        }
    };

    Ok(Series::new(column.name().clone(), scaled).into_column())
}
