use crate::config::BackoffConfig;
use crate::error::ConfigError;
use rand::{thread_rng, Rng};
use std::time::Duration;
use tracing::debug;

/// Exponential backoff counter.
///
/// Starts at `min` and multiplies by `factor` after every call to
/// [`Backoff::next_delay`], never exceeding `max`. [`Backoff::reset`] brings it
/// back to `min`. The counter only computes delays; sleeping is up to the caller.
///
/// The configuration fields are public so they can be tuned in place. Doing so
/// skips the checks performed by [`Backoff::new`].
#[derive(Clone, Debug, PartialEq)]
pub struct Backoff {
    /// Smallest delay ever returned, and the first one.
    pub min: Duration,
    /// Upper bound on every returned delay.
    pub max: Duration,
    /// Growth multiplier applied per attempt.
    pub factor: f64,
    /// Randomize each delay within `[min, computed]`.
    pub jitter: bool,
    pub(crate) attempts: u32,
}

impl Default for Backoff {
    fn default() -> Self {
        let cfg = BackoffConfig::default();
        Self {
            min: cfg.min,
            max: cfg.max,
            factor: cfg.factor,
            jitter: cfg.jitter,
            attempts: 0,
        }
    }
}

impl Backoff {
    pub fn new(min: Duration, max: Duration, factor: f64, jitter: bool) -> Result<Self, ConfigError> {
        validate(min, max, factor)?;
        Ok(Self {
            min,
            max,
            factor,
            jitter,
            attempts: 0,
        })
    }

    pub fn from_config(cfg: &BackoffConfig) -> Result<Self, ConfigError> {
        Self::new(cfg.min, cfg.max, cfg.factor, cfg.jitter)
    }

    /// Number of advances since construction or the last reset.
    pub fn attempt(&self) -> u32 {
        self.attempts
    }

    /// Returns the delay for the current attempt and advances the counter.
    pub fn next_delay(&mut self) -> Duration {
        self.next_delay_with_rng(&mut thread_rng())
    }

    /// Like [`Backoff::next_delay`], drawing jitter from `rng`.
    pub fn next_delay_with_rng<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Duration {
        let min = self.min.as_nanos() as f64;
        let mut nanos = min * self.factor.powf(self.attempts as f64);
        if self.jitter {
            nanos = rng.gen::<f64>() * (nanos - min) + min;
        }

        // Capped: the attempt count stays put so the exponent cannot run away.
        let Some(delay) = self.within_cap(nanos) else {
            debug!(attempt = self.attempts, max = ?self.max, "backoff capped");
            return self.max;
        };

        self.attempts = self.attempts.saturating_add(1);
        delay
    }

    /// Un-jittered delay for `attempt`, capped at `max`. Does not touch the counter.
    pub fn for_attempt(&self, attempt: u32) -> Duration {
        let nanos = self.min.as_nanos() as f64 * self.factor.powf(attempt as f64);
        self.within_cap(nanos).unwrap_or(self.max)
    }

    /// `None` when `nanos` lies above `max`.
    fn within_cap(&self, nanos: f64) -> Option<Duration> {
        if nanos > self.max.as_nanos() as f64 {
            return None;
        }
        // `as` saturates: NaN and negatives become zero.
        let delay = Duration::from_nanos(nanos as u64);
        // Past 2^53ns f64 rounding can step over either bound.
        if delay > self.max {
            return None;
        }
        if nanos >= self.min.as_nanos() as f64 && delay < self.min {
            return Some(self.min);
        }
        Some(delay)
    }

    pub fn reset(&mut self) {
        self.attempts = 0;
    }
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        Some(self.next_delay())
    }
}

pub(crate) fn validate(min: Duration, max: Duration, factor: f64) -> Result<(), ConfigError> {
    if min > max {
        return Err(ConfigError::MinExceedsMax { min, max });
    }
    if !factor.is_finite() || factor <= 0.0 {
        return Err(ConfigError::InvalidFactor(factor));
    }
    Ok(())
}
