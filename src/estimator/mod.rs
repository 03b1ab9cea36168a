//! TTL Estimator Module
//!
//! Maps a feature vector to a TTL: score with the configured strategy, clamp
//! to the bounds, smooth per key with an exponential moving average, add
//! optional jitter and clamp again.

mod jitter;
mod strategy;

pub use jitter::JitterSource;
pub use strategy::{FixedTtl, InverseFrequency, ScoringStrategy};

use std::fmt;

use tracing::trace;

use crate::config::{Config, StrategyKind};
use crate::error::{PredictorError, Result};
use crate::features::FeatureVector;
use crate::key::CacheKey;
use crate::sharded::ShardedLru;

// == TTL Bounds ==
/// Inclusive range every returned TTL falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlBounds {
    pub min: u64,
    pub max: u64,
}

impl TtlBounds {
    /// Creates bounds, swapping the ends if given in the wrong order.
    pub fn new(min: u64, max: u64) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    pub fn clamp(&self, ttl: u64) -> u64 {
        ttl.clamp(self.min, self.max)
    }

    pub fn clamp_secs(&self, ttl: f64) -> f64 {
        ttl.clamp(self.min as f64, self.max as f64)
    }

    pub fn contains(&self, ttl: u64) -> bool {
        (self.min..=self.max).contains(&ttl)
    }
}

impl Default for TtlBounds {
    fn default() -> Self {
        Self::new(10, 60)
    }
}

// == Smoothing State ==
/// Per-key moving average of past estimates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingState {
    pub last_estimate: f64,
    pub ema_alpha: f64,
}

impl SmoothingState {
    /// Folds a new raw estimate into the average and returns the result.
    pub fn update(&mut self, raw: f64) -> f64 {
        self.last_estimate = self.ema_alpha * raw + (1.0 - self.ema_alpha) * self.last_estimate;
        self.last_estimate
    }
}

/// Builds the strategy selected by `config`.
pub fn strategy_from_config(config: &Config) -> Box<dyn ScoringStrategy> {
    match config.strategy {
        StrategyKind::InverseFrequency => {
            Box::new(InverseFrequency::new(config.interval_multiplier))
        }
        StrategyKind::Fixed => Box::new(FixedTtl(config.default_ttl as f64)),
    }
}

// == TTL Estimator ==
pub struct TtlEstimator {
    strategy: Box<dyn ScoringStrategy>,
    smoothing: ShardedLru<SmoothingState>,
    bounds: TtlBounds,
    default_ttl: u64,
    ema_alpha: f64,
    jitter: Option<JitterSource>,
    /// Smoothing state untouched for longer than this is dropped by `evict_idle`
    idle_ms: u64,
}

impl TtlEstimator {
    // == Constructor ==
    /// Creates an estimator using `strategy` and the limits from `config`.
    ///
    /// Smoothing state shares the key cap and idle threshold of the history
    /// store.
    pub fn new(config: &Config, strategy: Box<dyn ScoringStrategy>) -> Self {
        let bounds = TtlBounds::new(config.min_ttl, config.max_ttl);
        Self {
            strategy,
            smoothing: ShardedLru::new(config.shard_count, config.max_tracked_keys),
            bounds,
            default_ttl: bounds.clamp(config.default_ttl),
            ema_alpha: config.ema_alpha.clamp(f64::MIN_POSITIVE, 1.0),
            jitter: None,
            idle_ms: config.idle_eviction_secs.saturating_mul(1000),
        }
    }

    /// Adds a jitter source applied after smoothing.
    pub fn with_jitter(mut self, jitter: JitterSource) -> Self {
        self.jitter = Some(jitter);
        self
    }

    // == Estimate ==
    /// Predicts a TTL for `key` from its features.
    ///
    /// Cold features yield the default TTL without touching smoothing state.
    /// A non-finite or negative score is an `EstimationFailure`.
    pub fn estimate(&self, key: &CacheKey, features: &FeatureVector, now_ms: u64) -> Result<u64> {
        if features.cold {
            return Ok(self.default_ttl);
        }

        let raw = self.strategy.score(features)?;
        if !raw.is_finite() || raw < 0.0 {
            return Err(PredictorError::EstimationFailure(format!(
                "strategy scored {} for key '{}'",
                raw, key
            )));
        }
        let raw = self.bounds.clamp_secs(raw);

        let alpha = self.ema_alpha;
        let smoothed = self.smoothing.with_entry(
            key,
            now_ms,
            || SmoothingState {
                last_estimate: raw,
                ema_alpha: alpha,
            },
            |state| state.update(raw),
        );

        let offset = self.jitter.as_ref().map_or(0.0, JitterSource::offset);
        let ttl = self.bounds.clamp_secs(smoothed + offset).round() as u64;
        trace!(key = %key, raw, smoothed, ttl, "estimated ttl");

        Ok(self.bounds.clamp(ttl))
    }

    /// Default TTL, already within bounds.
    pub fn default_ttl(&self) -> u64 {
        self.default_ttl
    }

    pub fn bounds(&self) -> TtlBounds {
        self.bounds
    }

    pub fn smoothing_state(&self, key: &CacheKey) -> Option<SmoothingState> {
        self.smoothing.read(key, |state| *state)
    }

    // == Evict Idle ==
    /// Drops smoothing state not updated within the idle threshold.
    pub fn evict_idle(&self, now_ms: u64) -> usize {
        let idle_ms = self.idle_ms;
        self.smoothing
            .retain(|_, _, last_seen| now_ms.saturating_sub(last_seen) <= idle_ms)
    }

    /// Number of keys with smoothing state.
    pub fn tracked_keys(&self) -> usize {
        self.smoothing.len()
    }
}

impl fmt::Debug for TtlEstimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlEstimator")
            .field("bounds", &self.bounds)
            .field("default_ttl", &self.default_ttl)
            .field("ema_alpha", &self.ema_alpha)
            .field("jitter", &self.jitter)
            .field("tracked_keys", &self.smoothing.len())
            .finish_non_exhaustive()
    }
}
