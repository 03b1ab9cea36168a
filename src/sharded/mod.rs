//! Sharded Module
//!
//! Bounded, lock-sharded per-key storage shared by the history store, the
//! estimator's smoothing state and the prediction cache.

mod lru;
mod map;

pub use lru::LruTracker;
pub use map::{LruShard, ShardedLru};
