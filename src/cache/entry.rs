//! Prediction Entry Module
//!
//! A computed TTL together with the short window during which it is reused.

use crate::key::CacheKey;

// == Prediction ==
/// A TTL computed for a key at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prediction {
    pub key: CacheKey,
    /// Predicted TTL in seconds
    pub ttl_seconds: u64,
    /// Computation timestamp (Unix milliseconds)
    pub computed_at_ms: u64,
    /// End of the coalescing window (Unix milliseconds)
    pub expires_at_ms: u64,
}

impl Prediction {
    // == Constructor ==
    /// Creates a prediction reusable for `window_ms` after `computed_at_ms`.
    ///
    /// The window is independent of `ttl_seconds`.
    pub fn new(key: CacheKey, ttl_seconds: u64, computed_at_ms: u64, window_ms: u64) -> Self {
        Self {
            key,
            ttl_seconds,
            computed_at_ms,
            expires_at_ms: computed_at_ms.saturating_add(window_ms),
        }
    }

    // == Is Expired ==
    /// Checks if the coalescing window has elapsed.
    ///
    /// Boundary condition: a prediction is expired once `now_ms` reaches
    /// `expires_at_ms`, so a 2 s window serves requests in `[t, t + 2s)`.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at_ms
    }

    /// Milliseconds left in the coalescing window, 0 once expired.
    pub fn window_remaining_ms(&self, now_ms: u64) -> u64 {
        self.expires_at_ms.saturating_sub(now_ms)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(computed_at_ms: u64) -> Prediction {
        Prediction::new(CacheKey::new("k").unwrap(), 30, computed_at_ms, 2_000)
    }

    #[test]
    fn test_prediction_fresh_within_window() {
        let p = prediction(1_000);
        assert!(!p.is_expired(1_000));
        assert!(!p.is_expired(2_999));
        assert_eq!(p.window_remaining_ms(2_000), 1_000);
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let p = prediction(1_000);
        assert!(p.is_expired(3_000), "Prediction should be expired at boundary");
        assert_eq!(p.window_remaining_ms(3_000), 0);
        assert_eq!(p.window_remaining_ms(10_000), 0);
    }

    #[test]
    fn test_window_saturates() {
        let p = Prediction::new(CacheKey::new("k").unwrap(), 30, u64::MAX - 1, 2_000);
        assert_eq!(p.expires_at_ms, u64::MAX);
    }
}
