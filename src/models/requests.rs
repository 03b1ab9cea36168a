//! Request DTOs for the predictor line protocol
//!
//! Defines the structure of incoming request lines.

use serde::Deserialize;

use crate::error::Result;
use crate::key::CacheKey;

/// Request body for the predict operation
///
/// # Fields
/// - `key`: The cache key whose TTL should be predicted
#[derive(Debug, Clone, Deserialize)]
pub struct PredictRequest {
    /// The cache key
    pub key: String,
}

impl PredictRequest {
    /// Validates the raw key and converts it into a [`CacheKey`].
    pub fn into_key(self) -> Result<CacheKey> {
        CacheKey::new(self.key)
    }
}
