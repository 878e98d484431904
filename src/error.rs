//! Error types
//!
//! Only configuration and camera acquisition can fail. Perception gaps and
//! late events after game over are normal operation, not errors.

use thiserror::Error;

/// Rejected configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("round duration must be positive, got {0}s")]
    InvalidDuration(i64),
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f32 },
    #[error("spawn weights must be non-negative and sum to at most 1.0")]
    InvalidWeights,
    #[error("tuning parse error")]
    Parse(#[from] serde_json::Error),
}

/// Camera acquisition failure. Fatal to the current screen, never retried.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MediaError {
    #[error("camera permission denied")]
    PermissionDenied,
    #[error("camera is in use by another application")]
    DeviceBusy,
    #[error("camera unavailable: {0}")]
    Unavailable(String),
}
