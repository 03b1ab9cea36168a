//! Response DTOs for the predictor line protocol
//!
//! Defines the structure of outgoing response lines.

use serde::Serialize;

use crate::error::PredictorError;
use crate::key::CacheKey;

/// Response body for the predict operation
#[derive(Debug, Clone, Serialize)]
pub struct PredictResponse {
    /// The requested key
    pub key: String,
    /// Predicted TTL in seconds
    pub ttl: u64,
}

impl PredictResponse {
    /// Creates a new PredictResponse
    pub fn new(key: &CacheKey, ttl: u64) -> Self {
        Self {
            key: key.as_str().to_string(),
            ttl,
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

impl From<&PredictorError> for ErrorResponse {
    fn from(err: &PredictorError) -> Self {
        Self::new(err.to_string())
    }
}
