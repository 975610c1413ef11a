//! Exponential backoff with multiplicative jitter.

use std::time::Duration;

use rand::Rng;

/// Source of uniform samples in `[0, 1)` used to jitter backoff delays.
///
/// Inject a fixed source to make delays deterministic in tests.
pub trait JitterSource: Send + Sync {
    fn sample(&self) -> f64;
}

impl<F> JitterSource for F
where
    F: Fn() -> f64 + Send + Sync,
{
    fn sample(&self) -> f64 {
        self()
    }
}

/// Thread-local RNG jitter, the default source.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngJitter;

impl JitterSource for ThreadRngJitter {
    fn sample(&self) -> f64 {
        rand::rng().random::<f64>()
    }
}

/// Un-jittered delay for a 0-indexed attempt: `min(max, base * 2^attempt)`.
pub fn exponential_delay(attempt: u32, base: Duration, max: Duration) -> Duration {
    let multiplier = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
    base.checked_mul(multiplier).unwrap_or(Duration::MAX).min(max)
}

/// Jittered delay before retrying after the 0-indexed `attempt` failed.
///
/// The result lies in `[0.5, 1.0] * exponential_delay(..)`, rounded to whole
/// milliseconds.
pub fn backoff_delay(
    attempt: u32,
    base: Duration,
    max: Duration,
    jitter: &dyn JitterSource,
) -> Duration {
    let exponential = exponential_delay(attempt, base, max).as_millis() as f64;
    let factor = jitter_factor(jitter.sample());
    Duration::from_millis((exponential * factor).round() as u64)
}

// Maps a [0, 1) sample onto [0.5, 1.0); out-of-range samples are clamped.
fn jitter_factor(sample: f64) -> f64 {
    let sample = if sample.is_finite() {
        sample.clamp(0.0, 1.0 - f64::EPSILON)
    } else {
        0.0
    };
    0.5 + sample * 0.5
}
