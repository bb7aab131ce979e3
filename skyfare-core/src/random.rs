use std::collections::VecDeque;

use parking_lot::Mutex;
use rand::Rng;

/// Source of randomness for demand sampling and payment simulation.
///
/// Injected rather than ambient so callers can supply deterministic
/// sequences in tests.
pub trait RandomSource: Send + Sync {
    /// Uniform draw from `[lo, hi)`.
    fn uniform(&self, lo: f64, hi: f64) -> f64;

    /// Uniform draw from `[0, 1)`.
    fn unit(&self) -> f64 {
        self.uniform(0.0, 1.0)
    }
}

/// Production source backed by the thread-local generator.
#[derive(Debug, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn uniform(&self, lo: f64, hi: f64) -> f64 {
        rand::thread_rng().gen_range(lo..hi)
    }
}

/// Deterministic source that replays a scripted sequence of unit-interval
/// fractions, mapped into each requested range.
///
/// When the script runs out it keeps returning the fallback fraction.
pub struct ScriptedRandom {
    fractions: Mutex<VecDeque<f64>>,
    fallback: f64,
}

impl ScriptedRandom {
    pub fn new(fractions: impl IntoIterator<Item = f64>) -> Self {
        Self {
            fractions: Mutex::new(fractions.into_iter().collect()),
            fallback: 0.5,
        }
    }

    /// Source that always yields the same fraction.
    pub fn constant(fraction: f64) -> Self {
        Self {
            fractions: Mutex::new(VecDeque::new()),
            fallback: fraction,
        }
    }
}

impl RandomSource for ScriptedRandom {
    fn uniform(&self, lo: f64, hi: f64) -> f64 {
        let fraction = self
            .fractions
            .lock()
            .pop_front()
            .unwrap_or(self.fallback);
        lo + fraction * (hi - lo)
    }
}
