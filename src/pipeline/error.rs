//! Error types for loading, enriching and aggregating churn data.
//!
//! `ChurnError` separates fatal input problems (schema, data) from caller
//! misuse of the aggregator (dimension selection, quantile range) so that a
//! presentation layer can decide which ones to show as plain messages.

use thiserror::Error;

use super::aggregate::Dimension;

/// Errors produced by the churn analysis core.
#[derive(Debug, Error)]
pub enum ChurnError {
    /// A required column is missing or has a type that cannot hold its values.
    #[error("Schema error in column '{column}': {reason}")]
    Schema { column: String, reason: String },

    /// A row carries a null, unparseable or out-of-domain raw value.
    ///
    /// `row` is the 1-based data row number (header excluded).
    #[error("Data error at row {row}, column '{column}': {reason}")]
    Data {
        row: usize,
        column: String,
        reason: String,
    },

    /// The requested grouping dimension is not one of the segmentable attributes.
    #[error("Unknown dimension '{0}'. Valid dimensions: {names}", names = Dimension::names().join(", "))]
    InvalidDimension(String),

    /// Both dimensions of a two-way aggregation are the same attribute.
    #[error("Cannot cross {0} with itself. Select two different dimensions.")]
    IdenticalDimensions(Dimension),

    /// A filter value that is not part of the attribute's closed set.
    #[error("Invalid {field} filter value '{value}'")]
    InvalidFilterValue { field: &'static str, value: String },

    /// Quantile outside the closed unit interval.
    #[error("Quantile must be between 0.0 and 1.0, got {0}")]
    InvalidQuantile(f64),

    /// Input file extension that the loader cannot read.
    #[error("Unsupported file format: '{0}'. Supported formats: csv, parquet")]
    UnsupportedFormat(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Polars(#[from] polars::prelude::PolarsError),
}

impl ChurnError {
    pub(crate) fn schema(column: &str, reason: impl Into<String>) -> Self {
        ChurnError::Schema {
            column: column.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn data(row_index: usize, column: &str, reason: impl Into<String>) -> Self {
        ChurnError::Data {
            row: row_index + 1,
            column: column.to_string(),
            reason: reason.into(),
        }
    }

    /// True for errors caused by the input dataset rather than by the caller.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ChurnError::Schema { .. }
                | ChurnError::Data { .. }
                | ChurnError::UnsupportedFormat(_)
                | ChurnError::Io(_)
                | ChurnError::Polars(_)
        )
    }
}

pub type ChurnResult<T> = std::result::Result<T, ChurnError>;
