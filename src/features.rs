//! Feature Extractor Module
//!
//! Turns a key's access history into the statistics the estimator scores.

use chrono::{DateTime, Timelike, Utc};

use crate::history::AccessRecord;

/// Number of coarse time-of-day buckets (6 hours each, UTC).
pub const TIME_OF_DAY_BUCKETS: u8 = 4;

// == Feature Vector ==
/// Request-scoped summary of a key's recent accesses.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    /// Records in the history
    pub access_count: usize,
    /// Records within the trailing window ending at the latest access
    pub trailing_count: usize,
    /// Mean gap between consecutive accesses, in seconds
    pub mean_interval_secs: f64,
    /// Population variance of the gaps, in seconds squared
    pub variance_interval_secs: f64,
    /// UTC hour of the latest access divided by 6
    pub time_of_day_bucket: u8,
    /// Latest access (Unix milliseconds), 0 when the history is empty
    pub latest_access_ms: u64,
    /// Fewer than two accesses: no interval to learn from
    pub cold: bool,
}

impl FeatureVector {
    /// Feature vector for a key without enough history.
    pub fn cold(history: &[AccessRecord]) -> Self {
        let latest_access_ms = history.last().map(|r| r.timestamp_ms).unwrap_or(0);
        Self {
            access_count: history.len(),
            trailing_count: history.len(),
            mean_interval_secs: 0.0,
            variance_interval_secs: 0.0,
            time_of_day_bucket: time_of_day_bucket(latest_access_ms),
            latest_access_ms,
            cold: true,
        }
    }

    /// Accesses per second implied by the mean interval.
    pub fn access_rate_hz(&self) -> f64 {
        if self.mean_interval_secs > 0.0 {
            1.0 / self.mean_interval_secs
        } else {
            f64::INFINITY
        }
    }
}

// == Running Stats ==
/// Welford's online mean and variance.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
}

impl RunningStats {
    pub fn push(&mut self, sample: f64) {
        self.count += 1;
        let delta = sample - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (sample - self.mean);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Population variance; zero with fewer than two samples.
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / self.count as f64
        }
    }
}

// == Feature Extractor ==
/// Pure history → features mapping.
#[derive(Debug, Clone, Copy)]
pub struct FeatureExtractor {
    trailing_window_ms: u64,
}

impl FeatureExtractor {
    pub fn new(trailing_window_secs: u64) -> Self {
        Self {
            trailing_window_ms: trailing_window_secs.saturating_mul(1000),
        }
    }

    // == Extract ==
    /// Summarizes `history`, which must be ordered most recent last.
    ///
    /// The trailing window is measured back from the latest record rather
    /// than from the current time, so the result depends on the history alone.
    pub fn extract(&self, history: &[AccessRecord]) -> FeatureVector {
        let Some(latest) = history.last().map(|r| r.timestamp_ms) else {
            return FeatureVector::cold(history);
        };
        if history.len() < 2 {
            return FeatureVector::cold(history);
        }

        let mut intervals = RunningStats::default();
        for pair in history.windows(2) {
            let gap_ms = pair[1].timestamp_ms.saturating_sub(pair[0].timestamp_ms);
            intervals.push(gap_ms as f64 / 1000.0);
        }

        let window_start = latest.saturating_sub(self.trailing_window_ms);
        let trailing_count = history
            .iter()
            .rev()
            .take_while(|r| r.timestamp_ms >= window_start)
            .count();

        FeatureVector {
            access_count: history.len(),
            trailing_count,
            mean_interval_secs: intervals.mean(),
            variance_interval_secs: intervals.variance(),
            time_of_day_bucket: time_of_day_bucket(latest),
            latest_access_ms: latest,
            cold: false,
        }
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new(60)
    }
}

/// Maps a Unix-millisecond timestamp to its 6-hour UTC bucket.
fn time_of_day_bucket(timestamp_ms: u64) -> u8 {
    let hour = i64::try_from(timestamp_ms)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|t| t.hour())
        .unwrap_or(0);
    (hour / (24 / u32::from(TIME_OF_DAY_BUCKETS))) as u8
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::CacheKey;

    fn history(timestamps: &[u64]) -> Vec<AccessRecord> {
        let key = CacheKey::new("k").unwrap();
        timestamps
            .iter()
            .map(|&timestamp_ms| AccessRecord {
                key: key.clone(),
                timestamp_ms,
            })
            .collect()
    }

    #[test]
    fn test_empty_history_is_cold() {
        let features = FeatureExtractor::default().extract(&[]);
        assert!(features.cold);
        assert_eq!(features.access_count, 0);
        assert_eq!(features.latest_access_ms, 0);
    }

    #[test]
    fn test_single_record_is_cold() {
        let features = FeatureExtractor::default().extract(&history(&[5_000]));
        assert!(features.cold);
        assert_eq!(features.access_count, 1);
        assert_eq!(features.latest_access_ms, 5_000);
    }

    #[test]
    fn test_regular_intervals() {
        let features = FeatureExtractor::default().extract(&history(&[0, 1_000, 2_000, 3_000]));

        assert!(!features.cold);
        assert_eq!(features.access_count, 4);
        assert!((features.mean_interval_secs - 1.0).abs() < 1e-9);
        assert!(features.variance_interval_secs.abs() < 1e-9);
        assert!((features.access_rate_hz() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_variance_of_uneven_intervals() {
        // Gaps of 1s and 3s: mean 2, population variance 1
        let features = FeatureExtractor::default().extract(&history(&[0, 1_000, 4_000]));
        assert!((features.mean_interval_secs - 2.0).abs() < 1e-9);
        assert!((features.variance_interval_secs - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_trailing_window_counts_from_latest() {
        let extractor = FeatureExtractor::new(10);
        let features = extractor.extract(&history(&[0, 50_000, 55_000, 60_000]));
        assert_eq!(features.trailing_count, 3);
    }

    #[test]
    fn test_identical_timestamps_have_zero_interval() {
        let features = FeatureExtractor::default().extract(&history(&[1_000, 1_000, 1_000]));
        assert!(!features.cold);
        assert_eq!(features.mean_interval_secs, 0.0);
        assert!(features.access_rate_hz().is_infinite());
    }

    #[test]
    fn test_time_of_day_bucket() {
        // 1970-01-01T00:00Z, 07:00Z, 13:00Z, 23:59Z
        assert_eq!(time_of_day_bucket(0), 0);
        assert_eq!(time_of_day_bucket(7 * 3_600_000), 1);
        assert_eq!(time_of_day_bucket(13 * 3_600_000), 2);
        assert_eq!(time_of_day_bucket(23 * 3_600_000 + 59 * 60_000), 3);
    }

    #[test]
    fn test_running_stats_matches_naive() {
        let samples = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let mut stats = RunningStats::default();
        for s in samples {
            stats.push(s);
        }
        assert_eq!(stats.count(), 8);
        assert!((stats.mean() - 5.0).abs() < 1e-12);
        assert!((stats.variance() - 4.0).abs() < 1e-12);
    }
}
