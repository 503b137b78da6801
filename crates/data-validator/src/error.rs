//! Validation Error Types

use thiserror::Error;

/// Errors during payload validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Value out of allowed range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// NaN or infinite float
    #[error("{0} must be a finite number")]
    NotFinite(&'static str),

    /// Binary indicator outside {0, 1}
    #[error("{field} must be 0 or 1, got {value}")]
    NotAFlag { field: &'static str, value: i64 },

    /// Invalid data format
    #[error("Invalid {field}: {reason}")]
    InvalidFormat { field: &'static str, reason: String },

    /// Missing required field
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}
