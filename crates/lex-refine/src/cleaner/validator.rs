//! Well-formedness checks run before any cleaning stage.

use super::TableRef;
use crate::error::ValidationError;
use tracing::error;

/// Check that a dataset is present, has columns and has at least one row.
///
/// Column lengths are always equal in a polars `DataFrame`, so there is no
/// ragged-table case to check here; raw records are checked for that while
/// being shaped (see [`dataset_from_records`](super::dataset_from_records)).
pub fn validate<'a>(input: impl Into<TableRef<'a>>) -> Result<(), ValidationError> {
    let Some(df) = input.into().get() else {
        error!("Input is not a DataFrame.");
        return Err(ValidationError::NotATable(
            "no dataset supplied".to_string(),
        ));
    };

    if df.width() == 0 {
        error!("DataFrame has no columns.");
        return Err(ValidationError::NoColumns);
    }

    if df.height() == 0 {
        error!("DataFrame is empty.");
        return Err(ValidationError::Empty);
    }

    Ok(())
}
