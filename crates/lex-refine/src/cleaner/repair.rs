//! Missing-value repair.

use crate::error::UtilityError;
use crate::utils::total_null_count;
use polars::prelude::*;
use tracing::debug;

/// True when every cell of every column is missing.
///
/// A table without columns counts as entirely missing.
pub fn is_entirely_missing(df: &DataFrame) -> bool {
    df.get_columns()
        .iter()
        .all(|col| col.null_count() == col.len())
}

/// Fill gaps by propagating the last present value forward, then the next
/// present value backward over leading gaps.
///
/// Columns with no present value at all are left as they are. Returns a new
/// DataFrame.
pub fn repair_missing(df: &DataFrame) -> Result<DataFrame, UtilityError> {
    let mut repaired = df.clone();
    if total_null_count(df) == 0 {
        return Ok(repaired);
    }

    let columns_with_gaps: Vec<String> = df
        .get_columns()
        .iter()
        .filter(|col| col.null_count() > 0)
        .map(|col| col.name().to_string())
        .collect();

    for name in &columns_with_gaps {
        let filled = {
            let series = repaired.column(name)?.as_materialized_series();
            let before = series.null_count();
            let filled = series
                .fill_null(FillNullStrategy::Forward(None))?
                .fill_null(FillNullStrategy::Backward(None))?;
            debug!(
                "Filled {} missing values in '{}'",
                before - filled.null_count(),
                name
            );
            filled
        };
        repaired.replace(name, filled)?;
    }

    Ok(repaired)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::column_values;

    #[test]
    fn test_forward_then_backward_fill() {
        let df = df![
            "A" => [None, Some(1.0), None, None, Some(4.0), None],
        ]
        .unwrap();

        let repaired = repair_missing(&df).unwrap();
        let values = column_values(repaired.column("A").unwrap()).unwrap();
        assert_eq!(
            values,
            vec![Some(1.0), Some(1.0), Some(1.0), Some(1.0), Some(4.0), Some(4.0)]
        );
        // Input left untouched
        assert_eq!(df.column("A").unwrap().null_count(), 4);
    }

    #[test]
    fn test_string_columns_are_filled_too() {
        let df = df!["label" => [Some("a"), None, Some("b")]].unwrap();
        let repaired = repair_missing(&df).unwrap();
        assert_eq!(repaired.column("label").unwrap().null_count(), 0);
    }

    #[test]
    fn test_no_gaps_is_noop() {
        let df = df!["A" => [1.0, 2.0]].unwrap();
        let repaired = repair_missing(&df).unwrap();
        assert!(repaired.equals(&df));
    }

    #[test]
    fn test_all_missing_column_left_alone() {
        let df = df![
            "empty" => [None::<f64>, None],
            "full" => [Some(1.0), None],
        ]
        .unwrap();
        let repaired = repair_missing(&df).unwrap();
        assert_eq!(repaired.column("empty").unwrap().null_count(), 2);
        assert_eq!(repaired.column("full").unwrap().null_count(), 0);
    }

    #[test]
    fn test_is_entirely_missing() {
        let all_missing = df![
            "a" => [None::<f64>, None],
            "b" => [None::<f64>, None],
        ]
        .unwrap();
        assert!(is_entirely_missing(&all_missing));

        let partly = df![
            "a" => [None::<f64>, None],
            "b" => [Some(1.0), None],
        ]
        .unwrap();
        assert!(!is_entirely_missing(&partly));
    }
}
