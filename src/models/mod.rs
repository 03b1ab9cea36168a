//! Request and Response models for the predictor line protocol
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing protocol lines.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::PredictRequest;
pub use responses::{ErrorResponse, PredictResponse};
