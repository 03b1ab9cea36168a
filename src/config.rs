//! Configuration Module
//!
//! Handles loading and managing predictor configuration from environment variables.

use std::env;
use std::str::FromStr;

use crate::error::{PredictorError, Result};

// == Strategy Kind ==
/// Which scoring strategy the estimator should run with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrategyKind {
    /// TTL proportional to the mean inter-access interval
    #[default]
    InverseFrequency,
    /// Always score the default TTL
    Fixed,
}

impl FromStr for StrategyKind {
    type Err = PredictorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inverse_frequency" | "inverse-frequency" => Ok(Self::InverseFrequency),
            "fixed" => Ok(Self::Fixed),
            other => Err(PredictorError::InvalidConfig(format!(
                "Unknown scoring strategy '{}'",
                other
            ))),
        }
    }
}

/// Predictor configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Lower bound for every predicted TTL, in seconds
    pub min_ttl: u64,
    /// Upper bound for every predicted TTL, in seconds
    pub max_ttl: u64,
    /// TTL returned for cold keys and on estimation failure
    pub default_ttl: u64,
    /// How long a computed prediction is reused, in seconds
    pub coalesce_window_secs: u64,
    /// Ring buffer size per key
    pub history_capacity_per_key: usize,
    /// Upper bound on keys tracked by each per-key store
    pub max_tracked_keys: usize,
    /// Weight of the newest estimate in the moving average
    pub ema_alpha: f64,
    /// Keys idle for longer than this are dropped by the sweep, in seconds
    pub idle_eviction_secs: u64,
    /// Trailing window used for the recent access count, in seconds
    pub trailing_window_secs: u64,
    /// Seconds of TTL granted per second of mean access interval
    pub interval_multiplier: f64,
    /// Number of lock shards per store
    pub shard_count: usize,
    /// Background sweep interval in seconds
    pub sweep_interval: u64,
    /// Maximum jitter added to a prediction, in seconds (0 disables)
    pub jitter_secs: f64,
    /// Seed for the jitter source; entropy when unset
    pub jitter_seed: Option<u64>,
    /// Scoring strategy
    pub strategy: StrategyKind,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MIN_TTL` / `MAX_TTL` - TTL bounds (default: 10 / 60)
    /// - `DEFAULT_TTL` - Cold-key TTL (default: 30)
    /// - `COALESCE_WINDOW_SECONDS` - Prediction reuse window (default: 2)
    /// - `HISTORY_CAPACITY_PER_KEY` - Ring buffer size (default: 32)
    /// - `MAX_TRACKED_KEYS` - Key cap per store (default: 100000)
    /// - `EMA_ALPHA` - Smoothing weight (default: 0.3)
    /// - `IDLE_EVICTION_SECONDS` - Idle key threshold (default: 3600)
    /// - `TRAILING_WINDOW_SECONDS` - Recent access window (default: 60)
    /// - `INTERVAL_MULTIPLIER` - TTL per second of interval (default: 10.0)
    /// - `SHARD_COUNT` - Lock shards per store (default: 16)
    /// - `SWEEP_INTERVAL` - Sweep frequency in seconds (default: 5)
    /// - `JITTER_SECONDS` - Jitter amplitude (default: 0.0)
    /// - `JITTER_SEED` - Jitter seed (default: unset)
    /// - `SCORING_STRATEGY` - `inverse_frequency` or `fixed`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            min_ttl: env_or("MIN_TTL", defaults.min_ttl),
            max_ttl: env_or("MAX_TTL", defaults.max_ttl),
            default_ttl: env_or("DEFAULT_TTL", defaults.default_ttl),
            coalesce_window_secs: env_or("COALESCE_WINDOW_SECONDS", defaults.coalesce_window_secs),
            history_capacity_per_key: env_or(
                "HISTORY_CAPACITY_PER_KEY",
                defaults.history_capacity_per_key,
            ),
            max_tracked_keys: env_or("MAX_TRACKED_KEYS", defaults.max_tracked_keys),
            ema_alpha: env_or("EMA_ALPHA", defaults.ema_alpha),
            idle_eviction_secs: env_or("IDLE_EVICTION_SECONDS", defaults.idle_eviction_secs),
            trailing_window_secs: env_or("TRAILING_WINDOW_SECONDS", defaults.trailing_window_secs),
            interval_multiplier: env_or("INTERVAL_MULTIPLIER", defaults.interval_multiplier),
            shard_count: env_or("SHARD_COUNT", defaults.shard_count),
            sweep_interval: env_or("SWEEP_INTERVAL", defaults.sweep_interval),
            jitter_secs: env_or("JITTER_SECONDS", defaults.jitter_secs),
            jitter_seed: env::var("JITTER_SEED").ok().and_then(|v| v.parse().ok()),
            strategy: env_or("SCORING_STRATEGY", defaults.strategy),
        }
    }

    // == Validate ==
    /// Checks that the values are mutually consistent.
    pub fn validate(&self) -> Result<()> {
        if self.min_ttl > self.max_ttl {
            return Err(PredictorError::InvalidConfig(format!(
                "min_ttl ({}) exceeds max_ttl ({})",
                self.min_ttl, self.max_ttl
            )));
        }
        if self.default_ttl < self.min_ttl || self.default_ttl > self.max_ttl {
            return Err(PredictorError::InvalidConfig(format!(
                "default_ttl ({}) outside [{}, {}]",
                self.default_ttl, self.min_ttl, self.max_ttl
            )));
        }
        if !(self.ema_alpha > 0.0 && self.ema_alpha <= 1.0) {
            return Err(PredictorError::InvalidConfig(format!(
                "ema_alpha ({}) must be in (0, 1]",
                self.ema_alpha
            )));
        }
        if self.coalesce_window_secs == 0 {
            return Err(PredictorError::InvalidConfig(
                "coalesce_window_secs must be positive".to_string(),
            ));
        }
        if self.history_capacity_per_key == 0 || self.max_tracked_keys == 0 || self.shard_count == 0
        {
            return Err(PredictorError::InvalidConfig(
                "capacities and shard_count must be positive".to_string(),
            ));
        }
        if !self.interval_multiplier.is_finite() || self.interval_multiplier < 0.0 {
            return Err(PredictorError::InvalidConfig(format!(
                "interval_multiplier ({}) must be a non-negative number",
                self.interval_multiplier
            )));
        }
        if !self.jitter_secs.is_finite() || self.jitter_secs < 0.0 {
            return Err(PredictorError::InvalidConfig(format!(
                "jitter_secs ({}) must be a non-negative number",
                self.jitter_secs
            )));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_ttl: 10,
            max_ttl: 60,
            default_ttl: 30,
            coalesce_window_secs: 2,
            history_capacity_per_key: 32,
            max_tracked_keys: 100_000,
            ema_alpha: 0.3,
            idle_eviction_secs: 3600,
            trailing_window_secs: 60,
            interval_multiplier: 10.0,
            shard_count: 16,
            sweep_interval: 5,
            jitter_secs: 0.0,
            jitter_seed: None,
            strategy: StrategyKind::InverseFrequency,
        }
    }
}

/// Reads and parses an environment variable, falling back on absence or parse failure.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.min_ttl, 10);
        assert_eq!(config.max_ttl, 60);
        assert_eq!(config.default_ttl, 30);
        assert_eq!(config.coalesce_window_secs, 2);
        assert_eq!(config.history_capacity_per_key, 32);
        assert_eq!(config.max_tracked_keys, 100_000);
        assert_eq!(config.ema_alpha, 0.3);
        assert_eq!(config.strategy, StrategyKind::InverseFrequency);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("MIN_TTL");
        env::remove_var("MAX_TTL");
        env::remove_var("DEFAULT_TTL");
        env::remove_var("EMA_ALPHA");

        let config = Config::from_env();
        assert_eq!(config.min_ttl, 10);
        assert_eq!(config.max_ttl, 60);
        assert_eq!(config.default_ttl, 30);
        assert_eq!(config.ema_alpha, 0.3);
    }

    #[test]
    fn test_env_or_falls_back_on_garbage() {
        env::set_var("TTL_PREDICTOR_TEST_GARBAGE", "not-a-number");
        assert_eq!(env_or("TTL_PREDICTOR_TEST_GARBAGE", 7u64), 7);
        env::remove_var("TTL_PREDICTOR_TEST_GARBAGE");
    }

    #[test]
    fn test_validate_rejects_inverted_bounds() {
        let config = Config {
            min_ttl: 60,
            max_ttl: 10,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(PredictorError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_default_outside_bounds() {
        let config = Config {
            default_ttl: 120,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_alpha() {
        for alpha in [0.0, -0.1, 1.5, f64::NAN] {
            let config = Config {
                ema_alpha: alpha,
                ..Config::default()
            };
            assert!(config.validate().is_err(), "alpha {} should be rejected", alpha);
        }
    }

    #[test]
    fn test_strategy_kind_parse() {
        assert_eq!(
            "inverse_frequency".parse::<StrategyKind>().unwrap(),
            StrategyKind::InverseFrequency
        );
        assert_eq!("FIXED".parse::<StrategyKind>().unwrap(), StrategyKind::Fixed);
        assert!("random".parse::<StrategyKind>().is_err());
    }
}
