//! Prediction Cache Module
//!
//! Memoizes predictions per key for the coalescing window so bursts of
//! requests for one key share a single computation.

use crate::cache::Prediction;
use crate::key::CacheKey;
use crate::sharded::ShardedLru;

// == Lookup ==
/// Outcome of [`PredictionCache::get_or_compute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// An unexpired prediction was already cached
    Hit(Prediction),
    /// The prediction was computed by this call and cached
    Computed(Prediction),
}

impl Lookup {
    pub fn prediction(&self) -> &Prediction {
        match self {
            Lookup::Hit(p) | Lookup::Computed(p) => p,
        }
    }

    pub fn into_prediction(self) -> Prediction {
        match self {
            Lookup::Hit(p) | Lookup::Computed(p) => p,
        }
    }

    pub fn is_hit(&self) -> bool {
        matches!(self, Lookup::Hit(_))
    }
}

// == Prediction Cache ==
#[derive(Debug)]
pub struct PredictionCache {
    entries: ShardedLru<Prediction>,
    /// Coalescing window in milliseconds
    window_ms: u64,
}

impl PredictionCache {
    // == Constructor ==
    /// Creates a cache reusing predictions for `window_secs`.
    ///
    /// # Arguments
    /// * `window_secs` - Coalescing window in seconds
    /// * `max_keys` - Upper bound on cached predictions
    /// * `shard_count` - Number of lock shards
    pub fn new(window_secs: u64, max_keys: usize, shard_count: usize) -> Self {
        Self {
            entries: ShardedLru::new(shard_count, max_keys),
            window_ms: window_secs.saturating_mul(1000),
        }
    }

    // == Get ==
    /// Returns the cached prediction if its window is still open.
    ///
    /// Expired predictions are removed on the way out.
    pub fn get(&self, key: &CacheKey, now_ms: u64) -> Option<Prediction> {
        let mut shard = self.entries.shard(key);
        let expired = shard.peek(key)?.is_expired(now_ms);
        if expired {
            shard.remove(key);
            return None;
        }
        shard.get_mut(key, now_ms).map(|p| p.clone())
    }

    // == Put ==
    /// Stores a prediction, replacing any previous one for the same key.
    pub fn put(&self, prediction: Prediction, now_ms: u64) {
        let key = prediction.key.clone();
        self.entries.shard(&key).insert(key, prediction, now_ms);
    }

    // == Get Or Compute ==
    /// Returns the cached prediction or computes, caches and returns a new one.
    ///
    /// The shard lock is held across the check and the fill, so concurrent
    /// misses for one key serialize: the first caller runs `compute`, the rest
    /// see its result as a hit.
    pub fn get_or_compute(
        &self,
        key: &CacheKey,
        now_ms: u64,
        compute: impl FnOnce() -> u64,
    ) -> Lookup {
        let mut shard = self.entries.shard(key);

        if let Some(cached) = shard.get_mut(key, now_ms) {
            if !cached.is_expired(now_ms) {
                return Lookup::Hit(cached.clone());
            }
        }

        let prediction = Prediction::new(key.clone(), compute(), now_ms, self.window_ms);
        shard.insert(key.clone(), prediction.clone(), now_ms);
        Lookup::Computed(prediction)
    }

    // == Sweep Expired ==
    /// Removes all predictions whose window has closed.
    ///
    /// Returns the number of entries removed.
    pub fn sweep_expired(&self, now_ms: u64) -> usize {
        self.entries
            .retain(|_, prediction, _| !prediction.is_expired(now_ms))
    }

    /// Current number of cached predictions, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn window_ms(&self) -> u64 {
        self.window_ms
    }

    /// Predictions dropped because the cache was at capacity.
    pub fn evictions(&self) -> u64 {
        self.entries.evictions()
    }
}
