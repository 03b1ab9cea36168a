//! TTL Predictor - Adaptive TTL prediction for a caching layer
//!
//! Predicts how long a cached value should live from each key's recent access
//! pattern: hot keys get short TTLs, rarely read keys get long ones.

pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod estimator;
pub mod features;
pub mod history;
pub mod key;
pub mod models;
pub mod service;
pub mod sharded;
pub mod tasks;


pub use cache::{Prediction, StatsSnapshot};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use error::{PredictorError, Result};
pub use key::CacheKey;
pub use service::{PredictionService, SweepReport};
pub use tasks::spawn_sweep_task;
