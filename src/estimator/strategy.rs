//! Scoring Strategies
//!
//! A strategy turns a warm feature vector into a raw TTL in seconds. The
//! estimator clamps, smooths and rounds whatever comes back.

use crate::error::Result;
use crate::features::FeatureVector;

// == Scoring Strategy ==
/// Pluggable TTL scorer.
///
/// Any `Fn(&FeatureVector) -> Result<f64>` closure is a strategy, which is how
/// a model-backed scorer can be plugged in without touching the service.
pub trait ScoringStrategy: Send + Sync {
    /// Raw TTL in seconds for a warm feature vector.
    fn score(&self, features: &FeatureVector) -> Result<f64>;
}

impl<F> ScoringStrategy for F
where
    F: Fn(&FeatureVector) -> Result<f64> + Send + Sync,
{
    fn score(&self, features: &FeatureVector) -> Result<f64> {
        self(features)
    }
}

// == Inverse Frequency ==
/// TTL inversely proportional to access frequency.
///
/// `ttl = interval_multiplier / access_rate = interval_multiplier * mean_interval`.
/// Hot keys get short TTLs to stay fresh; rarely read keys get long TTLs to
/// save recomputation.
#[derive(Debug, Clone, Copy)]
pub struct InverseFrequency {
    pub interval_multiplier: f64,
}

impl InverseFrequency {
    pub fn new(interval_multiplier: f64) -> Self {
        Self {
            interval_multiplier,
        }
    }
}

impl Default for InverseFrequency {
    fn default() -> Self {
        Self::new(10.0)
    }
}

impl ScoringStrategy for InverseFrequency {
    fn score(&self, features: &FeatureVector) -> Result<f64> {
        Ok(self.interval_multiplier * features.mean_interval_secs)
    }
}

// == Fixed TTL ==
/// Ignores the features and always scores the same TTL.
#[derive(Debug, Clone, Copy)]
pub struct FixedTtl(pub f64);

impl ScoringStrategy for FixedTtl {
    fn score(&self, _features: &FeatureVector) -> Result<f64> {
        Ok(self.0)
    }
}
