//! Background Tasks Module
//!
//! Contains background tasks that run periodically while the predictor is up.
//!
//! # Tasks
//! - Sweep: drops expired predictions and idle per-key state

mod sweep;

pub use sweep::spawn_sweep_task;
