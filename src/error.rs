//! Error types for the ACO solver.

use thiserror::Error;

/// Result type alias for solver operations.
pub type AcoResult<T> = Result<T, AcoError>;

/// Errors raised by instance loading, configuration and the optimizer.
#[derive(Debug, Error)]
pub enum AcoError {
    /// Unusable input data (too few cities, non-finite coordinates, bad index).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A configuration value outside its valid domain.
    #[error("Invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// What is wrong with its value.
        message: String,
    },

    /// Bookkeeping bug detected during tour construction.
    #[error("Internal invariant violated: {0}")]
    InternalInvariantViolation(String),

    /// Instance file could not be parsed.
    #[error("Parse error at line {line}: {message}")]
    Parse {
        /// 1-based line number.
        line: usize,
        message: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AcoError {
    pub(crate) fn parameter(name: &'static str, message: impl Into<String>) -> Self {
        AcoError::InvalidParameter {
            name,
            message: message.into(),
        }
    }
}
