//! Cache Module
//!
//! Short-lived memoization of computed TTLs, plus request statistics.

mod entry;
mod stats;
mod store;

// Re-export public types
pub use entry::Prediction;
pub use stats::{PredictionStats, StatsSnapshot};
pub use store::{Lookup, PredictionCache};
