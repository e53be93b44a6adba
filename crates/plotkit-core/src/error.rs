//! Error handling for PlotKit
//!
//! A single taxonomy covers every pipeline failure:
//! - Parse errors (malformed or missing root geometry)
//! - Empty results (nothing drawable)
//! - Cancellation and timeout control signals raised by the processing framework
//! - Parameter validation and unexpected internal failures
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Pipeline error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProcessingError {
    /// The input markup is not well-formed or lacks a root drawable container
    #[error("Parse error: {reason}")]
    Parse {
        /// Description of what could not be parsed.
        reason: String,
    },

    /// Extraction produced zero polylines
    #[error("Nothing drawable found")]
    EmptyResult,

    /// The run was superseded or explicitly cancelled
    #[error("Processing cancelled")]
    Cancelled,

    /// The run exceeded its wall-clock budget
    #[error("Processing timed out after {elapsed_ms}ms")]
    Timeout {
        /// Elapsed run time when the budget was exceeded.
        elapsed_ms: u64,
    },

    /// Parameters failed validation
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// Any other failure
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProcessingError {
    /// Create a parse error from any displayable reason.
    pub fn parse(reason: impl Into<String>) -> Self {
        Self::Parse {
            reason: reason.into(),
        }
    }

    /// True for the cancellation control signal.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// True for the timeout signal.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Message shown to a user, or `None` when the error must be dropped silently.
    pub fn user_message(&self) -> Option<String> {
        match self {
            Self::Cancelled => None,
            Self::Timeout { .. } => {
                Some("Processing took too long. Try reducing detail.".to_string())
            }
            Self::EmptyResult => Some("Nothing drawable found in the input.".to_string()),
            Self::Parse { reason } => Some(format!("Could not read the drawing: {}", reason)),
            Self::InvalidParameters(reason) => Some(format!("Invalid settings: {}", reason)),
            Self::Internal(_) => Some("Toolpath generation failed.".to_string()),
        }
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, ProcessingError>;
