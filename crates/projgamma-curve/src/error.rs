//! Curve error types.

use thiserror::Error;

/// Result type for curve operations.
pub type CurveResult<T> = Result<T, CurveError>;

/// Errors that can occur while building, editing or restoring curves.
#[derive(Debug, Error)]
pub enum CurveError {
    /// Structurally invalid parameters (non-finite values, clip ordering).
    #[error("invalid parameter {field}: {reason}")]
    Parameter {
        /// Offending field
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// Record written by a newer schema than this build understands.
    #[error("unsupported record schema {found} (newest supported is {supported})")]
    UnsupportedSchema {
        /// Schema version in the record
        found: u32,
        /// Newest version this build reads
        supported: u32,
    },

    /// Malformed record contents.
    #[error("invalid record: {0}")]
    Record(String),

    /// Table with the wrong number of entries or out of range codes.
    #[error("invalid table size: {0}")]
    InvalidSize(String),
}

impl CurveError {
    /// Creates a parameter error.
    pub fn parameter(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Parameter {
            field,
            reason: reason.into(),
        }
    }

    /// Creates a record error.
    pub fn record(msg: impl Into<String>) -> Self {
        Self::Record(msg.into())
    }

    /// Returns true for structurally invalid parameters.
    pub fn is_parameter(&self) -> bool {
        matches!(self, Self::Parameter { .. })
    }
}
