//! Access History Store Module
//!
//! Per-key ring buffers of recent access timestamps, held in a sharded LRU
//! map so both the per-key history and the number of tracked keys stay
//! bounded.

use crate::history::{AccessRecord, RingBuffer};
use crate::key::CacheKey;
use crate::sharded::ShardedLru;

// == Access History Store ==
#[derive(Debug)]
pub struct AccessHistoryStore {
    buffers: ShardedLru<RingBuffer>,
    capacity_per_key: usize,
    /// Keys whose last access is older than this are dropped by `evict_idle`
    idle_ms: u64,
}

impl AccessHistoryStore {
    // == Constructor ==
    /// Creates a store.
    ///
    /// # Arguments
    /// * `capacity_per_key` - Ring buffer size per key
    /// * `max_keys` - Upper bound on tracked keys
    /// * `shard_count` - Number of lock shards
    /// * `idle_secs` - Idle threshold for `evict_idle`
    pub fn new(capacity_per_key: usize, max_keys: usize, shard_count: usize, idle_secs: u64) -> Self {
        Self {
            buffers: ShardedLru::new(shard_count, max_keys),
            capacity_per_key: capacity_per_key.max(1),
            idle_ms: idle_secs.saturating_mul(1000),
        }
    }

    // == Record Access ==
    /// Appends `now_ms` to the key's history, overwriting the oldest record
    /// when the buffer is full.
    pub fn record_access(&self, key: &CacheKey, now_ms: u64) {
        let capacity = self.capacity_per_key;
        self.buffers.with_entry(
            key,
            now_ms,
            || RingBuffer::with_capacity(capacity),
            |ring| ring.push(now_ms),
        );
    }

    // == Get History ==
    /// Returns the key's access records, most recent last. Unseen keys yield
    /// an empty history.
    pub fn get_history(&self, key: &CacheKey) -> Vec<AccessRecord> {
        self.buffers
            .read(key, |ring| {
                ring.iter()
                    .map(|timestamp_ms| AccessRecord {
                        key: key.clone(),
                        timestamp_ms,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of records currently held for `key`.
    pub fn history_len(&self, key: &CacheKey) -> usize {
        self.buffers.read(key, RingBuffer::len).unwrap_or(0)
    }

    // == Evict Idle ==
    /// Drops keys not accessed within the idle threshold.
    ///
    /// Returns the number of keys removed.
    pub fn evict_idle(&self, now_ms: u64) -> usize {
        let idle_ms = self.idle_ms;
        self.buffers
            .retain(|_, _, last_seen| now_ms.saturating_sub(last_seen) <= idle_ms)
    }

    /// Number of tracked keys.
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// Keys dropped because the store was at capacity.
    pub fn evictions(&self) -> u64 {
        self.buffers.evictions()
    }

    pub fn capacity_per_key(&self) -> usize {
        self.capacity_per_key
    }
}
