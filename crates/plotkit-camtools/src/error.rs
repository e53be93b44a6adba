//! Error types for the camtools crate.
//!
//! Parameter validation errors live here; everything that can abort a
//! pipeline run is expressed as [`ProcessingError`] from `plotkit-core`.

use plotkit_core::ProcessingError;
use thiserror::Error;

/// Errors related to plot parameter validation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    /// A parameter value is out of the valid range.
    #[error("Parameter '{name}' out of range: {value} (valid: {min}..{max})")]
    OutOfRange {
        name: String,
        value: f64,
        min: f64,
        max: f64,
    },

    /// A parameter value is invalid.
    #[error("Invalid value for '{name}': {reason}")]
    InvalidValue { name: String, reason: String },
}

impl ParameterError {
    pub(crate) fn invalid(name: &str, reason: &str) -> Self {
        Self::InvalidValue {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<ParameterError> for ProcessingError {
    fn from(err: ParameterError) -> Self {
        ProcessingError::InvalidParameters(err.to_string())
    }
}

/// Result type alias for parameter validation.
pub type ParameterResult<T> = Result<T, ParameterError>;
