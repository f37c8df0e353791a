//! Retry stage with exponential backoff and jitter.

use crate::{ApiError, HttpClientError, Request, RequestContext, Response, Result, Transport};
use async_trait::async_trait;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Lower bound of the jitter multiplier.
pub const JITTER_MIN: f64 = 0.75;
/// Upper bound of the jitter multiplier.
pub const JITTER_MAX: f64 = 1.25;

/// Retry configuration.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry, doubled for each later one.
    pub initial_backoff: Duration,
    /// Cap on the un-jittered delay.
    pub max_backoff: Duration,
    /// Status codes that should trigger a retry.
    pub retry_status_codes: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(30),
            retry_status_codes: vec![429, 502, 503, 504],
        }
    }
}

impl RetryConfig {
    pub fn new(max_retries: u32, initial_backoff: Duration) -> Self {
        Self {
            max_retries,
            initial_backoff,
            ..Default::default()
        }
    }

    /// Replace the set of retryable status codes.
    pub fn with_status_codes(mut self, codes: Vec<u16>) -> Self {
        self.retry_status_codes = codes;
        self
    }

    pub fn with_max_backoff(mut self, max: Duration) -> Self {
        self.max_backoff = max;
        self
    }

    /// `initial_backoff * 2^attempt`, capped at `max_backoff`.
    pub fn base_delay(&self, attempt: u32) -> Duration {
        2u32.checked_pow(attempt)
            .and_then(|factor| self.initial_backoff.checked_mul(factor))
            .map_or(self.max_backoff, |delay| delay.min(self.max_backoff))
    }

    /// Delay after the 0-based `attempt` failed, scaled by `jitter`.
    pub fn delay_for_attempt(&self, attempt: u32, jitter: f64) -> Duration {
        self.base_delay(attempt).mul_f64(jitter.clamp(JITTER_MIN, JITTER_MAX))
    }

    /// Check if a status code should trigger a retry.
    pub fn should_retry_status(&self, status: u16) -> bool {
        self.retry_status_codes.contains(&status)
    }
}

/// Source of the backoff jitter multiplier.
pub trait Jitter: Send + Sync {
    /// A multiplier in `[JITTER_MIN, JITTER_MAX]`.
    fn factor(&self) -> f64;
}

/// Uniform jitter from an RNG owned by this instance.
pub struct RandomJitter {
    rng: Mutex<StdRng>,
}

impl RandomJitter {
    /// Seeded from the operating system.
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Reproducible sequence.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomJitter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RandomJitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomJitter").finish_non_exhaustive()
    }
}

impl Jitter for RandomJitter {
    fn factor(&self) -> f64 {
        self.rng.lock().random_range(JITTER_MIN..=JITTER_MAX)
    }
}

/// Always the same multiplier.
#[derive(Debug, Clone, Copy)]
pub struct FixedJitter(pub f64);

impl Jitter for FixedJitter {
    fn factor(&self) -> f64 {
        self.0.clamp(JITTER_MIN, JITTER_MAX)
    }
}

/// Re-issues idempotent requests on transport errors and retryable statuses.
pub struct RetryTransport<T> {
    inner: T,
    config: RetryConfig,
    jitter: Arc<dyn Jitter>,
}

impl<T> RetryTransport<T> {
    pub fn new(inner: T, config: RetryConfig) -> Self {
        Self {
            inner,
            config,
            jitter: Arc::new(RandomJitter::new()),
        }
    }

    pub fn with_jitter(mut self, jitter: Arc<dyn Jitter>) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    fn is_retryable(&self, outcome: &Result<Response>) -> bool {
        match outcome {
            Ok(response) => self.config.should_retry_status(response.status().as_u16()),
            Err(e) => e.is_transport(),
        }
    }
}

#[async_trait]
impl<T: Transport> Transport for RetryTransport<T> {
    async fn send(&self, ctx: &RequestContext, request: &Request) -> Result<Response> {
        let idempotent = request.is_idempotent();
        let max_attempts = self.config.max_retries.saturating_add(1);
        let mut attempt: u32 = 0;

        loop {
            ctx.check()?;

            let outcome = self.inner.send(ctx, request).await;
            attempt += 1;

            if !idempotent || !self.is_retryable(&outcome) {
                return outcome;
            }

            if attempt >= max_attempts {
                let last = match outcome {
                    Ok(response) => HttpClientError::Api(ApiError::from_body(
                        response.status().as_u16(),
                        response.bytes(),
                    )),
                    Err(e) => e,
                };
                warn!(
                    method = %request.method(),
                    url = %request.url(),
                    attempts = attempt,
                    error = %last,
                    "Retries exhausted"
                );
                return Err(HttpClientError::RetryExhausted {
                    attempts: attempt,
                    source: Box::new(last),
                });
            }

            let delay = self
                .config
                .delay_for_attempt(attempt - 1, self.jitter.factor());

            match &outcome {
                Ok(response) => debug!(
                    attempt,
                    status = response.status().as_u16(),
                    delay_ms = delay.as_millis() as u64,
                    "Retrying request due to status code"
                ),
                Err(e) => debug!(
                    attempt,
                    error = %e,
                    delay_ms = delay.as_millis() as u64,
                    "Retrying request due to error"
                ),
            }

            // Release the failed attempt before waiting.
            drop(outcome);

            ctx.sleep(delay).await?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_backoff() {
        let config = RetryConfig::new(5, Duration::from_millis(100));

        assert_eq!(config.base_delay(0), Duration::from_millis(100));
        assert_eq!(config.base_delay(1), Duration::from_millis(200));
        assert_eq!(config.base_delay(2), Duration::from_millis(400));
        assert_eq!(config.base_delay(3), Duration::from_millis(800));
    }

    #[test]
    fn test_backoff_is_capped() {
        let config =
            RetryConfig::new(50, Duration::from_secs(1)).with_max_backoff(Duration::from_secs(5));

        assert_eq!(config.base_delay(2), Duration::from_secs(4));
        assert_eq!(config.base_delay(3), Duration::from_secs(5));
        assert_eq!(config.base_delay(40), Duration::from_secs(5));
    }

    #[test]
    fn test_jitter_scales_delay() {
        let config = RetryConfig::new(3, Duration::from_secs(1));

        assert_eq!(config.delay_for_attempt(1, 0.75), Duration::from_millis(1500));
        assert_eq!(config.delay_for_attempt(1, 1.25), Duration::from_millis(2500));
        // out-of-range factors are clamped
        assert_eq!(config.delay_for_attempt(0, 3.0), Duration::from_millis(1250));
        assert_eq!(config.delay_for_attempt(0, 0.0), Duration::from_millis(750));
    }

    #[test]
    fn test_random_jitter_stays_in_bounds() {
        let jitter = RandomJitter::new();
        for _ in 0..1000 {
            let factor = jitter.factor();
            assert!((JITTER_MIN..=JITTER_MAX).contains(&factor));
        }
    }

    #[test]
    fn test_seeded_jitter_is_reproducible() {
        let a = RandomJitter::seeded(42);
        let b = RandomJitter::seeded(42);
        for _ in 0..10 {
            assert_eq!(a.factor(), b.factor());
        }
    }

    #[test]
    fn test_default_retry_statuses() {
        let config = RetryConfig::default();
        for status in [429, 502, 503, 504] {
            assert!(config.should_retry_status(status));
        }
        for status in [400, 401, 404, 500, 501] {
            assert!(!config.should_retry_status(status));
        }
    }
}
