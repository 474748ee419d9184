use rand::Rng;
use std::time::Duration;

/// Exponential backoff with additive jitter.
///
/// The delay before retry `n` (0-based) is `base * 2^n` plus a uniform
/// `[0, jitter_ratio)` fraction of that value. Jitter is only ever added,
/// so the expected delay never shrinks between attempts.
#[derive(Debug, Clone, PartialEq)]
pub struct Backoff {
    base: Duration,
    jitter_ratio: f64,
}

impl Backoff {
    pub fn new(base: Duration, jitter_ratio: f64) -> Self {
        let jitter_ratio = if jitter_ratio.is_finite() {
            jitter_ratio.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self { base, jitter_ratio }
    }

    pub fn base(&self) -> Duration {
        self.base
    }

    pub fn jitter_ratio(&self) -> f64 {
        self.jitter_ratio
    }

    /// Un-jittered delay for `attempt`.
    pub fn nominal(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base.saturating_mul(factor)
    }

    pub fn delay(&self, attempt: u32) -> Duration {
        self.delay_with(attempt, &mut rand::thread_rng())
    }

    pub fn delay_with<R: Rng>(&self, attempt: u32, rng: &mut R) -> Duration {
        let nominal = self.nominal(attempt);
        if self.jitter_ratio <= 0.0 || nominal.is_zero() {
            return nominal;
        }
        let fraction = rng.gen_range(0.0..self.jitter_ratio);
        let jitter = Duration::try_from_secs_f64(nominal.as_secs_f64() * fraction)
            .unwrap_or(Duration::ZERO);
        nominal.saturating_add(jitter)
    }
}
