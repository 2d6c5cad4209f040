//! Domain-level error taxonomy for the aircon engine.

use aircon_state::{RecordError, StorageError};

/// Errors produced by input validation.
///
/// These are caller contract violations: the engine refuses to run rather
/// than produce a recommendation from malformed conditions.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must be a finite number, got {value}")]
    NonFinite { field: &'static str, value: f64 },

    #[error("{field} must be {constraint}, got {value}")]
    OutOfRange {
        field: &'static str,
        constraint: &'static str,
        value: f64,
    },

    #[error("unknown AC type: {value:?}")]
    UnknownAcType { value: String },

    #[error("unknown compressor type: {value:?}")]
    UnknownCompressor { value: String },

    #[error("position must be clock tokens like 11o or 11o,2o, got {value:?}")]
    InvalidPosition { value: String },

    #[error(transparent)]
    Record(#[from] RecordError),
}

/// aircon domain errors.
#[derive(Debug, thiserror::Error)]
pub enum AirconError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for aircon domain operations.
pub type Result<T> = std::result::Result<T, AirconError>;
