//! History Module
//!
//! Bounded record of when each key was last requested.

mod ring;
mod store;

pub use ring::RingBuffer;
pub use store::AccessHistoryStore;

use crate::key::CacheKey;

// == Access Record ==
/// One observed access to a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRecord {
    pub key: CacheKey,
    /// Access time (Unix milliseconds)
    pub timestamp_ms: u64,
}
