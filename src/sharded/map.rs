//! Sharded LRU Map Module
//!
//! Concurrent per-key state container. A key hashes to one of a fixed number
//! of shards; each shard is a mutex-guarded map with its own LRU tracker and
//! capacity, so unrelated keys rarely contend and memory stays bounded.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use parking_lot::{Mutex, MutexGuard};

use crate::key::CacheKey;
use crate::sharded::LruTracker;

#[derive(Debug)]
struct Slot<V> {
    value: V,
    /// Last time the key was written or touched (Unix milliseconds)
    last_seen_ms: u64,
}

// == LRU Shard ==
/// One partition of a [`ShardedLru`].
#[derive(Debug)]
pub struct LruShard<V> {
    entries: HashMap<CacheKey, Slot<V>>,
    lru: LruTracker,
    capacity: usize,
    evictions: u64,
}

impl<V> LruShard<V> {
    fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            capacity,
            evictions: 0,
        }
    }

    // == Get Mut ==
    /// Returns the value for `key`, marking it most recently used.
    pub fn get_mut(&mut self, key: &CacheKey, now_ms: u64) -> Option<&mut V> {
        let slot = self.entries.get_mut(key)?;
        slot.last_seen_ms = now_ms;
        self.lru.touch(key);
        Some(&mut slot.value)
    }

    // == Peek ==
    /// Returns the value for `key` without touching it.
    pub fn peek(&self, key: &CacheKey) -> Option<&V> {
        self.entries.get(key).map(|slot| &slot.value)
    }

    // == Insert ==
    /// Inserts or replaces the value for `key`.
    ///
    /// A new key in a full shard evicts the least recently used key, which is
    /// returned.
    pub fn insert(&mut self, key: CacheKey, value: V, now_ms: u64) -> Option<CacheKey> {
        let evicted = if self.entries.contains_key(&key) {
            None
        } else {
            self.make_room()
        };

        self.lru.touch(&key);
        self.entries.insert(
            key,
            Slot {
                value,
                last_seen_ms: now_ms,
            },
        );
        evicted
    }

    // == Get Or Insert With ==
    /// Returns the value for `key`, creating it with `init` if absent.
    pub fn get_or_insert_with(
        &mut self,
        key: &CacheKey,
        now_ms: u64,
        init: impl FnOnce() -> V,
    ) -> &mut V {
        if !self.entries.contains_key(key) {
            self.make_room();
        }

        self.lru.touch(key);
        let slot = self.entries.entry(key.clone()).or_insert_with(|| Slot {
            value: init(),
            last_seen_ms: now_ms,
        });
        slot.last_seen_ms = now_ms;
        &mut slot.value
    }

    // == Remove ==
    pub fn remove(&mut self, key: &CacheKey) -> Option<V> {
        self.lru.remove(key);
        self.entries.remove(key).map(|slot| slot.value)
    }

    // == Retain ==
    /// Keeps only the entries for which `keep(key, value, last_seen_ms)` holds.
    ///
    /// Returns the number of entries removed.
    pub fn retain(&mut self, mut keep: impl FnMut(&CacheKey, &V, u64) -> bool) -> usize {
        let doomed: Vec<CacheKey> = self
            .entries
            .iter()
            .filter(|(key, slot)| !keep(key, &slot.value, slot.last_seen_ms))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &doomed {
            self.entries.remove(key);
            self.lru.remove(key);
        }
        doomed.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn make_room(&mut self) -> Option<CacheKey> {
        if self.entries.len() < self.capacity {
            return None;
        }
        let evicted = self.lru.evict_oldest()?;
        self.entries.remove(&evicted);
        self.evictions += 1;
        Some(evicted)
    }
}

// == Sharded LRU ==
/// Fixed set of [`LruShard`]s addressed by key hash.
///
/// The combined capacity never exceeds the `max_keys` given at construction.
#[derive(Debug)]
pub struct ShardedLru<V> {
    shards: Box<[Mutex<LruShard<V>>]>,
    per_shard_capacity: usize,
}

impl<V> ShardedLru<V> {
    // == Constructor ==
    /// Creates a map of up to `shard_count` shards holding at most `max_keys` keys.
    ///
    /// The shard count is lowered when `max_keys` is smaller, so every shard
    /// can hold at least one key.
    pub fn new(shard_count: usize, max_keys: usize) -> Self {
        let max_keys = max_keys.max(1);
        let shard_count = shard_count.clamp(1, max_keys);
        let per_shard_capacity = max_keys / shard_count;

        let shards = (0..shard_count)
            .map(|_| Mutex::new(LruShard::new(per_shard_capacity)))
            .collect();

        Self {
            shards,
            per_shard_capacity,
        }
    }

    // == Shard ==
    /// Locks and returns the shard owning `key`.
    pub fn shard(&self, key: &CacheKey) -> MutexGuard<'_, LruShard<V>> {
        self.shards[self.shard_index(key)].lock()
    }

    // == With Entry ==
    /// Runs `f` on the value for `key`, creating it with `init` if absent.
    pub fn with_entry<R>(
        &self,
        key: &CacheKey,
        now_ms: u64,
        init: impl FnOnce() -> V,
        f: impl FnOnce(&mut V) -> R,
    ) -> R {
        let mut shard = self.shard(key);
        f(shard.get_or_insert_with(key, now_ms, init))
    }

    // == Read ==
    /// Runs `f` on the value for `key` if present, without touching it.
    pub fn read<R>(&self, key: &CacheKey, f: impl FnOnce(&V) -> R) -> Option<R> {
        self.shard(key).peek(key).map(f)
    }

    pub fn remove(&self, key: &CacheKey) -> Option<V> {
        self.shard(key).remove(key)
    }

    // == Retain ==
    /// Applies [`LruShard::retain`] to every shard, one lock at a time.
    pub fn retain(&self, mut keep: impl FnMut(&CacheKey, &V, u64) -> bool) -> usize {
        self.shards
            .iter()
            .map(|shard| shard.lock().retain(&mut keep))
            .sum()
    }

    /// Total number of keys across all shards.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.lock().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of capacity evictions since creation.
    pub fn evictions(&self) -> u64 {
        self.shards.iter().map(|shard| shard.lock().evictions).sum()
    }

    /// Maximum number of keys the map can hold.
    pub fn capacity(&self) -> usize {
        self.per_shard_capacity * self.shards.len()
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    fn shard_index(&self, key: &CacheKey) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() as usize) % self.shards.len()
    }
}
