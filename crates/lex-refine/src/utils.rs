//! Shared helpers for working with polars columns.

use polars::prelude::*;

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Names of the numeric columns of a DataFrame, in column order.
pub fn numeric_column_names(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|col| is_numeric_dtype(col.dtype()))
        .map(|col| col.name().to_string())
        .collect()
}

/// Read a numeric column as `f64` values.
///
/// Nulls and NaN both come back as `None`: a missing entry is a missing
/// entry, whatever produced it.
pub fn column_values(column: &Column) -> PolarsResult<Vec<Option<f64>>> {
    let series = column.as_materialized_series().cast(&DataType::Float64)?;
    Ok(series
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect())
}

/// Cast columns holding no present value to `Float64`.
///
/// Readers type an empty column from nothing (CSV infers `String`); a column
/// of only gaps carries no type information and is treated as numeric.
pub fn all_missing_as_float(df: DataFrame) -> PolarsResult<DataFrame> {
    if !df
        .get_columns()
        .iter()
        .any(|col| col.null_count() == col.len() && col.dtype() != &DataType::Float64)
    {
        return Ok(df);
    }

    let columns = df
        .get_columns()
        .iter()
        .map(|col| {
            if col.null_count() == col.len() && col.dtype() != &DataType::Float64 {
                col.cast(&DataType::Float64)
            } else {
                Ok(col.clone())
            }
        })
        .collect::<PolarsResult<Vec<_>>>()?;
    DataFrame::new(columns)
}

/// Total number of null cells in a DataFrame.
pub fn total_null_count(df: &DataFrame) -> usize {
    df.get_columns().iter().map(|col| col.null_count()).sum()
}
