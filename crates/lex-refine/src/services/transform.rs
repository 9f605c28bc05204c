use super::{ENRICHED_COLUMN, TRANSFORMED_COLUMN, Transformer};
use crate::error::ServiceError;
use crate::utils::{column_values, is_numeric_dtype};
use polars::prelude::*;
use tracing::error;

/// Derives `transformed = enriched * factor` (factor 2 by default).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalingTransformer {
    factor: f64,
}

impl Default for ScalingTransformer {
    fn default() -> Self {
        Self { factor: 2.0 }
    }
}

impl ScalingTransformer {
    pub fn new(factor: f64) -> Self {
        Self { factor }
    }
}

impl Transformer for ScalingTransformer {
    fn transform(&self, df: &DataFrame) -> Result<DataFrame, ServiceError> {
        let Ok(enriched) = df.column(ENRICHED_COLUMN) else {
            error!("Data transformation failed: '{}' column not found", ENRICHED_COLUMN);
            return Err(ServiceError::MissingColumn(ENRICHED_COLUMN.to_string()));
        };

        if !is_numeric_dtype(enriched.dtype()) {
            return Err(ServiceError::TransformFailed(format!(
                "'{}' is {}, expected a numeric column",
                ENRICHED_COLUMN,
                enriched.dtype()
            )));
        }

        let scaled: Vec<Option<f64>> = column_values(enriched)?
            .into_iter()
            .map(|v| v.map(|x| x * self.factor))
            .collect();

        let mut transformed = df.clone();
        transformed.with_column(Series::new(TRANSFORMED_COLUMN.into(), scaled))?;
        Ok(transformed)
    }

    fn name(&self) -> &str {
        "scaling"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_data_success() {
        let df = df![ENRICHED_COLUMN => [4.0, 6.0]].unwrap();
        let result = ScalingTransformer::default().transform(&df).unwrap();
        let values = column_values(result.column(TRANSFORMED_COLUMN).unwrap()).unwrap();
        assert_eq!(values, vec![Some(8.0), Some(12.0)]);
    }

    #[test]
    fn test_transform_data_missing_enriched_column() {
        let df = df!["A" => [1, 2]].unwrap();
        let result = ScalingTransformer::default().transform(&df);
        assert!(matches!(
            result,
            Err(ServiceError::MissingColumn(ref column)) if column == ENRICHED_COLUMN
        ));
    }

    #[test]
    fn test_transform_non_numeric_enriched_column() {
        let df = df![ENRICHED_COLUMN => ["a", "b"]].unwrap();
        assert!(matches!(
            ScalingTransformer::new(3.0).transform(&df),
            Err(ServiceError::TransformFailed(_))
        ));
    }
}
