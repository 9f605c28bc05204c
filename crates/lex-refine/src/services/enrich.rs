use super::{ENRICHED_COLUMN, Enricher};
use crate::error::ServiceError;
use crate::utils::{column_values, is_numeric_dtype};
use polars::prelude::*;
use tracing::error;

/// Adds the row-wise sum of all numeric columns as `enriched`.
///
/// Missing cells count as zero. Any non-numeric column makes the sum
/// ill-defined and fails the enrichment.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowSumEnricher;

impl Enricher for RowSumEnricher {
    fn enrich(&self, df: &DataFrame) -> Result<DataFrame, ServiceError> {
        if let Some(col) = df
            .get_columns()
            .iter()
            .find(|col| !is_numeric_dtype(col.dtype()))
        {
            error!("Data enrichment failed on column '{}'", col.name());
            return Err(ServiceError::EnrichmentFailed(format!(
                "cannot sum non-numeric column '{}' ({})",
                col.name(),
                col.dtype()
            )));
        }

        let mut sums = vec![0.0_f64; df.height()];
        for col in df.get_columns() {
            for (sum, value) in sums.iter_mut().zip(column_values(col)?) {
                *sum += value.unwrap_or(0.0);
            }
        }

        let mut enriched = df.clone();
        enriched.with_column(Series::new(ENRICHED_COLUMN.into(), sums))?;
        Ok(enriched)
    }

    fn name(&self) -> &str {
        "row-sum"
    }
}
