//! Error types for the TTL predictor
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Predictor Error Enum ==
/// Unified error type for the TTL predictor.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictorError {
    /// Key is empty, too long or otherwise malformed
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Feature extraction or scoring produced an unusable result
    #[error("Estimation failure: {0}")]
    EstimationFailure(String),

    /// Configuration values are inconsistent
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

// == Result Type Alias ==
/// Convenience Result type for the TTL predictor.
pub type Result<T> = std::result::Result<T, PredictorError>;
