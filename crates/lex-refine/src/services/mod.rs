//! Enrichment and transform services.
//!
//! The processor calls an [`Enricher`] on the cleaned table, then a
//! [`Transformer`] on the enriched one. Both are injected as trait objects;
//! the built-in [`RowSumEnricher`] and [`ScalingTransformer`] are used when
//! nothing else is supplied.
//!
//! # Implementing a service
//!
//! ```rust,ignore
//! use lex_refine::services::Enricher;
//! use lex_refine::ServiceError;
//! use polars::prelude::*;
//!
//! struct RowCount;
//!
//! impl Enricher for RowCount {
//!     fn enrich(&self, df: &DataFrame) -> Result<DataFrame, ServiceError> {
//!         let mut out = df.clone();
//!         let ids: Vec<u32> = (0..df.height() as u32).collect();
//!         out.with_column(Series::new("row".into(), ids))?;
//!         Ok(out)
//!     }
//! }
//! ```

mod enrich;
mod transform;

pub use enrich::RowSumEnricher;
pub use transform::ScalingTransformer;

use crate::error::ServiceError;
use polars::prelude::DataFrame;

/// Column added by [`RowSumEnricher`].
pub const ENRICHED_COLUMN: &str = "enriched";

/// Column added by [`ScalingTransformer`].
pub const TRANSFORMED_COLUMN: &str = "transformed";

/// Adds derived columns to a cleaned table.
///
/// Implementations must be `Send + Sync` and must not modify their input.
pub trait Enricher: Send + Sync {
    fn enrich(&self, df: &DataFrame) -> Result<DataFrame, ServiceError>;

    /// Name used in logs and the run report.
    fn name(&self) -> &str {
        "enricher"
    }
}

/// Derives further columns from an enriched table.
///
/// A transformer may depend on columns its enricher added; a missing
/// dependency is a [`ServiceError`], never a silent default.
pub trait Transformer: Send + Sync {
    fn transform(&self, df: &DataFrame) -> Result<DataFrame, ServiceError>;

    /// Name used in logs and the run report.
    fn name(&self) -> &str {
        "transformer"
    }
}
