//! Data cleaning stages.
//!
//! This module provides:
//! - Shaping raw records into a table and validating it
//! - Z-score normalization of numeric columns
//! - Forward/backward repair of missing values
//!
//! Every operation takes its input as a [`TableRef`], so an absent dataset is
//! rejected with the operation's own error kind instead of being impossible
//! to express.

mod normalizer;
mod records;
mod repair;
mod validator;

pub use normalizer::{normalize_data, normalize_with_ddof};
pub use records::dataset_from_records;
pub use repair::{is_entirely_missing, repair_missing};
pub use validator::validate;

use polars::prelude::DataFrame;

/// A borrowed dataset handed to a cleaning operation.
///
/// `None` stands for an absent dataset.
#[derive(Debug, Clone, Copy)]
pub struct TableRef<'a>(Option<&'a DataFrame>);

impl<'a> TableRef<'a> {
    /// An absent dataset.
    pub fn absent() -> Self {
        Self(None)
    }

    pub fn get(self) -> Option<&'a DataFrame> {
        self.0
    }
}

impl<'a> From<&'a DataFrame> for TableRef<'a> {
    fn from(df: &'a DataFrame) -> Self {
        Self(Some(df))
    }
}

impl<'a> From<Option<&'a DataFrame>> for TableRef<'a> {
    fn from(df: Option<&'a DataFrame>) -> Self {
        Self(df)
    }
}
