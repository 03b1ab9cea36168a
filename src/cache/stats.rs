//! Prediction Statistics Module
//!
//! Tracks how requests were served: cache hits, fresh computations, cold
//! keys and fallbacks to the default TTL.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Prediction Stats ==
/// Lock-free counters updated on every request.
#[derive(Debug, Default)]
pub struct PredictionStats {
    requests: AtomicU64,
    hits: AtomicU64,
    computations: AtomicU64,
    cold_computations: AtomicU64,
    fallbacks: AtomicU64,
}

impl PredictionStats {
    // == Constructor ==
    /// Creates a new PredictionStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Request served from the prediction cache.
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Request that ran the full extraction and estimation path.
    pub fn record_computation(&self) {
        self.computations.fetch_add(1, Ordering::Relaxed);
    }

    /// Computation for a key without enough history.
    pub fn record_cold(&self) {
        self.cold_computations.fetch_add(1, Ordering::Relaxed);
    }

    /// Computation that failed and fell back to the default TTL.
    pub fn record_fallback(&self) {
        self.fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    // == Snapshot ==
    /// Copies the counters into a serializable snapshot.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot::new(
            self.requests.load(Ordering::Relaxed),
            self.hits.load(Ordering::Relaxed),
            self.computations.load(Ordering::Relaxed),
            self.cold_computations.load(Ordering::Relaxed),
            self.fallbacks.load(Ordering::Relaxed),
        )
    }
}

// == Stats Snapshot ==
/// Point-in-time view of [`PredictionStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub requests: u64,
    pub hits: u64,
    pub computations: u64,
    pub cold_computations: u64,
    pub fallbacks: u64,
    /// hits / requests
    pub hit_rate: f64,
}

impl StatsSnapshot {
    pub fn new(
        requests: u64,
        hits: u64,
        computations: u64,
        cold_computations: u64,
        fallbacks: u64,
    ) -> Self {
        let hit_rate = if requests == 0 {
            0.0
        } else {
            hits as f64 / requests as f64
        };
        Self {
            requests,
            hits,
            computations,
            cold_computations,
            fallbacks,
            hit_rate,
        }
    }
}
