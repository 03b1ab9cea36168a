//! Seedable jitter source
//!
//! Spreads otherwise identical TTLs so that keys cached together do not all
//! expire in the same instant.

use parking_lot::Mutex;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

// == Jitter Source ==
/// Uniform offsets in `[-amplitude, amplitude]` seconds.
#[derive(Debug)]
pub struct JitterSource {
    rng: Mutex<ChaCha8Rng>,
    amplitude_secs: f64,
}

impl JitterSource {
    /// Reproducible source; the same seed yields the same offsets.
    pub fn seeded(amplitude_secs: f64, seed: u64) -> Self {
        Self {
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
            amplitude_secs: amplitude_secs.abs(),
        }
    }

    /// Source seeded from OS entropy.
    pub fn from_entropy(amplitude_secs: f64) -> Self {
        Self {
            rng: Mutex::new(ChaCha8Rng::from_entropy()),
            amplitude_secs: amplitude_secs.abs(),
        }
    }

    /// Next offset in seconds.
    pub fn offset(&self) -> f64 {
        if self.amplitude_secs == 0.0 {
            return 0.0;
        }
        self.rng
            .lock()
            .gen_range(-self.amplitude_secs..=self.amplitude_secs)
    }

    pub fn amplitude_secs(&self) -> f64 {
        self.amplitude_secs
    }
}
