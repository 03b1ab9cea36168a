//! Prediction Service Module
//!
//! Ties the stores together: consult the prediction cache, and on a miss
//! record the access, extract features, estimate and cache the result.
//! `predict` never fails for a valid key; any estimation fault degrades to
//! the default TTL.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::{Prediction, PredictionCache, PredictionStats, StatsSnapshot};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::{PredictorError, Result};
use crate::estimator::{strategy_from_config, JitterSource, TtlBounds, TtlEstimator};
use crate::features::FeatureExtractor;
use crate::history::{AccessHistoryStore, AccessRecord};
use crate::key::CacheKey;

// == Sweep Report ==
/// What a call to [`PredictionService::sweep`] removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub expired_predictions: usize,
    pub idle_histories: usize,
    pub idle_smoothing_states: usize,
}

impl SweepReport {
    pub fn total(&self) -> usize {
        self.expired_predictions + self.idle_histories + self.idle_smoothing_states
    }
}

// == Prediction Service ==
#[derive(Debug)]
pub struct PredictionService {
    history: AccessHistoryStore,
    extractor: FeatureExtractor,
    estimator: TtlEstimator,
    cache: PredictionCache,
    stats: PredictionStats,
    clock: Arc<dyn Clock>,
}

impl PredictionService {
    // == Constructors ==
    /// Builds a service from configuration using the system clock.
    pub fn from_config(config: &Config) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Builds a service from configuration with an explicit clock.
    ///
    /// Jitter is enabled when `jitter_secs` is positive, seeded from
    /// `jitter_seed` when set.
    pub fn with_clock(config: &Config, clock: Arc<dyn Clock>) -> Self {
        let mut estimator = TtlEstimator::new(config, strategy_from_config(config));
        if config.jitter_secs > 0.0 {
            let jitter = match config.jitter_seed {
                Some(seed) => JitterSource::seeded(config.jitter_secs, seed),
                None => JitterSource::from_entropy(config.jitter_secs),
            };
            estimator = estimator.with_jitter(jitter);
        }
        Self::new(config, estimator, clock)
    }

    /// Builds a service around a preconfigured estimator.
    pub fn new(config: &Config, estimator: TtlEstimator, clock: Arc<dyn Clock>) -> Self {
        Self {
            history: AccessHistoryStore::new(
                config.history_capacity_per_key,
                config.max_tracked_keys,
                config.shard_count,
                config.idle_eviction_secs,
            ),
            extractor: FeatureExtractor::new(config.trailing_window_secs),
            estimator,
            cache: PredictionCache::new(
                config.coalesce_window_secs,
                config.max_tracked_keys,
                config.shard_count,
            ),
            stats: PredictionStats::new(),
            clock,
        }
    }

    // == Predict ==
    /// Returns the predicted TTL in seconds for `key`.
    pub fn predict(&self, key: &CacheKey) -> u64 {
        self.predict_detailed(key).ttl_seconds
    }

    /// Same as [`predict`](Self::predict) but returns the whole prediction.
    ///
    /// Every call records an access, whether or not it was served from cache.
    pub fn predict_detailed(&self, key: &CacheKey) -> Prediction {
        let now_ms = self.clock.now_ms();
        self.stats.record_request();

        let lookup = self
            .cache
            .get_or_compute(key, now_ms, || self.compute(key, now_ms));

        if lookup.is_hit() {
            self.history.record_access(key, now_ms);
            self.stats.record_hit();
        }
        lookup.into_prediction()
    }

    /// Validates a raw key and predicts its TTL.
    pub fn predict_str(&self, raw_key: &str) -> Result<u64> {
        let key = CacheKey::new(raw_key)?;
        Ok(self.predict(&key))
    }

    fn compute(&self, key: &CacheKey, now_ms: u64) -> u64 {
        self.stats.record_computation();
        self.history.record_access(key, now_ms);

        match self.try_estimate(key, now_ms) {
            Ok(ttl) => ttl,
            Err(err) => {
                self.stats.record_fallback();
                warn!(key = %key, error = %err, "Estimation failed, using default TTL");
                self.estimator.default_ttl()
            }
        }
    }

    fn try_estimate(&self, key: &CacheKey, now_ms: u64) -> Result<u64> {
        let history = self.history.get_history(key);
        let features = self.extractor.extract(&history);
        if features.cold {
            self.stats.record_cold();
        }

        // A plugged-in strategy may panic; treat that like any other failure
        let ttl = panic::catch_unwind(AssertUnwindSafe(|| {
            self.estimator.estimate(key, &features, now_ms)
        }))
        .map_err(|_| PredictorError::EstimationFailure("scoring strategy panicked".to_string()))??;

        debug!(
            key = %key,
            ttl,
            cold = features.cold,
            accesses = features.access_count,
            mean_interval_secs = features.mean_interval_secs,
            "Computed prediction"
        );
        Ok(ttl)
    }

    // == Sweep ==
    /// Removes expired predictions and state for idle keys.
    pub fn sweep(&self) -> SweepReport {
        let now_ms = self.clock.now_ms();
        SweepReport {
            expired_predictions: self.cache.sweep_expired(now_ms),
            idle_histories: self.history.evict_idle(now_ms),
            idle_smoothing_states: self.estimator.evict_idle(now_ms),
        }
    }

    // == Accessors ==
    /// Access history for `key`, most recent last.
    pub fn history(&self, key: &CacheKey) -> Vec<AccessRecord> {
        self.history.get_history(key)
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn bounds(&self) -> TtlBounds {
        self.estimator.bounds()
    }

    pub fn default_ttl(&self) -> u64 {
        self.estimator.default_ttl()
    }

    /// Number of keys with recorded history.
    pub fn tracked_keys(&self) -> usize {
        self.history.len()
    }

    /// Number of cached predictions, including ones not yet swept.
    pub fn cached_predictions(&self) -> usize {
        self.cache.len()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::estimator::{FixedTtl, ScoringStrategy};
    use crate::features::FeatureVector;
    use std::time::Duration;

    const START_MS: u64 = 1_700_000_000_000;

    fn k(s: &str) -> CacheKey {
        CacheKey::new(s).unwrap()
    }

    fn service_with(strategy: Box<dyn ScoringStrategy>) -> (PredictionService, Arc<ManualClock>) {
        let config = Config::default();
        let clock = Arc::new(ManualClock::new(START_MS));
        let estimator = TtlEstimator::new(&config, strategy);
        (PredictionService::new(&config, estimator, clock.clone()), clock)
    }

    fn service() -> (PredictionService, Arc<ManualClock>) {
        let config = Config::default();
        let clock = Arc::new(ManualClock::new(START_MS));
        (PredictionService::with_clock(&config, clock.clone()), clock)
    }

    #[test]
    fn test_first_call_returns_default() {
        let (svc, _) = service();
        assert_eq!(svc.predict(&k("new")), 30);

        let stats = svc.stats();
        assert_eq!(stats.computations, 1);
        assert_eq!(stats.cold_computations, 1);
    }

    #[test]
    fn test_hit_still_records_access() {
        let (svc, clock) = service();
        let key = k("a");

        svc.predict(&key);
        clock.advance(Duration::from_millis(500));
        svc.predict(&key);

        assert_eq!(svc.history(&key).len(), 2);
        let stats = svc.stats();
        assert_eq!(stats.requests, 2);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.computations, 1);
    }

    #[test]
    fn test_failing_strategy_falls_back_to_default() {
        let (svc, clock) = service_with(Box::new(|_: &FeatureVector| -> Result<f64> {
            Err(PredictorError::EstimationFailure("model offline".to_string()))
        }));
        let key = k("a");

        svc.predict(&key);
        clock.advance(Duration::from_secs(3));
        assert_eq!(svc.predict(&key), 30);
        assert_eq!(svc.stats().fallbacks, 1);
    }

    #[test]
    fn test_panicking_strategy_falls_back_to_default() {
        let (svc, clock) = service_with(Box::new(|_: &FeatureVector| -> Result<f64> {
            panic!("bad model")
        }));
        let key = k("a");

        svc.predict(&key);
        clock.advance(Duration::from_secs(3));
        assert_eq!(svc.predict(&key), 30);
        assert_eq!(svc.stats().fallbacks, 1);

        // The service keeps working afterwards
        clock.advance(Duration::from_secs(3));
        assert_eq!(svc.predict(&k("other")), 30);
    }

    #[test]
    fn test_fixed_strategy_after_warmup() {
        let (svc, clock) = service_with(Box::new(FixedTtl(45.0)));
        let key = k("a");

        assert_eq!(svc.predict(&key), 30);
        clock.advance(Duration::from_secs(3));
        assert_eq!(svc.predict(&key), 45);
    }

    #[test]
    fn test_predict_str_rejects_invalid_key() {
        let (svc, _) = service();
        assert!(matches!(svc.predict_str(""), Err(PredictorError::InvalidKey(_))));
        assert_eq!(svc.predict_str("fine").unwrap(), 30);
    }

    #[test]
    fn test_sweep_removes_expired_and_idle() {
        let (svc, clock) = service();
        svc.predict(&k("a"));
        svc.predict(&k("b"));

        clock.advance(Duration::from_secs(3));
        let report = svc.sweep();
        assert_eq!(report.expired_predictions, 2);
        assert_eq!(report.idle_histories, 0);
        assert_eq!(svc.tracked_keys(), 2);

        clock.advance(Duration::from_secs(3_601));
        let report = svc.sweep();
        assert_eq!(report.idle_histories, 2);
        assert_eq!(svc.tracked_keys(), 0);
    }

    #[test]
    fn test_jitter_from_config_is_seeded() {
        let config = Config {
            jitter_secs: 5.0,
            jitter_seed: Some(11),
            strategy: crate::config::StrategyKind::Fixed,
            ..Config::default()
        };
        let run = || {
            let clock = Arc::new(ManualClock::new(START_MS));
            let svc = PredictionService::with_clock(&config, clock.clone());
            let key = k("a");
            svc.predict(&key);
            clock.advance(Duration::from_secs(3));
            svc.predict(&key)
        };

        let ttl = run();
        assert_eq!(ttl, run());
        assert!((25..=35).contains(&ttl));
    }
}
