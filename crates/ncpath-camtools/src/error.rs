//! Parameter validation errors for the planners.
//!
//! Configuration problems are fatal at startup and never reach the motion
//! pipeline.

use thiserror::Error;

/// Errors related to planner parameter validation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    /// A parameter value is out of the valid range.
    #[error("Parameter '{name}' out of range: {value} (valid: {min}..{max})")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// A parameter value is invalid for a reason other than range.
    #[error("Invalid value for '{name}': {reason}")]
    InvalidValue {
        name: &'static str,
        reason: &'static str,
    },
}

/// Result type alias for parameter validation.
pub type ParameterResult<T> = Result<T, ParameterError>;
