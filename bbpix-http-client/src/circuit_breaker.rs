//! Circuit breaker pattern implementation.

use crate::{HttpClientError, Request, RequestContext, Response, Result, Transport};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Circuit breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Circuit is closed, requests are allowed.
    Closed,
    /// Circuit is open, requests are rejected.
    Open,
    /// One probe request is allowed through to test recovery.
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CircuitState::Closed => write!(f, "closed"),
            CircuitState::Open => write!(f, "open"),
            CircuitState::HalfOpen => write!(f, "half-open"),
        }
    }
}

/// Circuit breaker configuration.
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Name used in log events.
    pub name: String,
    /// Number of consecutive failures to open the circuit.
    pub failure_threshold: u32,
    /// Time after the last failure before a probe is allowed.
    pub reset_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            name: "bbpix".to_string(),
            failure_threshold: 5,
            reset_timeout: Duration::from_secs(60),
        }
    }
}

impl CircuitBreakerConfig {
    /// Create a new circuit breaker config.
    pub fn new(failure_threshold: u32, reset_timeout: Duration) -> Self {
        Self {
            failure_threshold,
            reset_timeout,
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

#[derive(Debug)]
struct BreakerState {
    state: CircuitState,
    consecutive_failures: u32,
    last_failure: Option<Instant>,
    probe_in_flight: bool,
}

/// Tracks consecutive failures and fails fast while open.
///
/// Transitions are closed to open at the failure threshold, open to
/// half-open once the reset timeout has passed since the last failure
/// (checked when a call is attempted), and half-open to closed or open on
/// the probe's outcome. All state sits behind one lock.
#[derive(Debug)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    state: Mutex<BreakerState>,
}

impl CircuitBreaker {
    /// Create a new circuit breaker.
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            state: Mutex::new(BreakerState {
                state: CircuitState::Closed,
                consecutive_failures: 0,
                last_failure: None,
                probe_in_flight: false,
            }),
        }
    }

    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Get the current circuit state.
    pub fn state(&self) -> CircuitState {
        self.state.lock().state
    }

    /// Consecutive failures recorded since the last success.
    pub fn failure_count(&self) -> u32 {
        self.state.lock().consecutive_failures
    }

    /// Ask to make a call.
    ///
    /// Returns [`HttpClientError::CircuitOpen`] without side effects while
    /// the circuit is open, or while a half-open probe is already running.
    pub fn try_acquire(&self) -> Result<Permit<'_>> {
        let mut s = self.state.lock();

        match s.state {
            CircuitState::Closed => Ok(Permit::new(self, false)),
            CircuitState::Open => {
                let cooled_down = s
                    .last_failure
                    .is_none_or(|at| at.elapsed() > self.config.reset_timeout);
                if !cooled_down {
                    return Err(HttpClientError::CircuitOpen);
                }
                s.state = CircuitState::HalfOpen;
                s.probe_in_flight = true;
                info!(breaker = %self.config.name, "Circuit breaker half-open, allowing probe");
                Ok(Permit::new(self, true))
            }
            CircuitState::HalfOpen if s.probe_in_flight => Err(HttpClientError::CircuitOpen),
            CircuitState::HalfOpen => {
                s.probe_in_flight = true;
                Ok(Permit::new(self, true))
            }
        }
    }

    /// Reset the circuit breaker to closed state.
    pub fn reset(&self) {
        let mut s = self.state.lock();
        s.state = CircuitState::Closed;
        s.consecutive_failures = 0;
        s.last_failure = None;
        s.probe_in_flight = false;
    }

    fn on_success(&self, probe: bool) {
        let mut s = self.state.lock();
        match s.state {
            CircuitState::Closed => s.consecutive_failures = 0,
            CircuitState::HalfOpen if probe => {
                s.state = CircuitState::Closed;
                s.consecutive_failures = 0;
                s.probe_in_flight = false;
                info!(breaker = %self.config.name, "Circuit breaker closed");
            }
            // outcome of a call admitted before the circuit opened
            _ => debug!(breaker = %self.config.name, "Ignoring stale success"),
        }
    }

    fn on_failure(&self, probe: bool) {
        let mut s = self.state.lock();
        match s.state {
            CircuitState::Closed => {
                s.consecutive_failures = s.consecutive_failures.saturating_add(1);
                s.last_failure = Some(Instant::now());
                if s.consecutive_failures >= self.config.failure_threshold {
                    s.state = CircuitState::Open;
                    warn!(
                        breaker = %self.config.name,
                        failures = s.consecutive_failures,
                        reset_timeout_ms = self.config.reset_timeout.as_millis() as u64,
                        "Circuit breaker opened"
                    );
                }
            }
            CircuitState::HalfOpen if probe => {
                s.state = CircuitState::Open;
                s.consecutive_failures = s.consecutive_failures.saturating_add(1);
                s.last_failure = Some(Instant::now());
                s.probe_in_flight = false;
                warn!(breaker = %self.config.name, "Probe failed, circuit breaker reopened");
            }
            _ => debug!(breaker = %self.config.name, "Ignoring stale failure"),
        }
    }

    fn release(&self, probe: bool) {
        if probe {
            let mut s = self.state.lock();
            if s.state == CircuitState::HalfOpen {
                s.probe_in_flight = false;
            }
        }
    }
}

/// Admission to make one call through a [`CircuitBreaker`].
///
/// Dropping a permit without recording an outcome leaves the breaker as it
/// was, except that a half-open probe slot is freed for the next caller.
#[must_use = "record the outcome of the call"]
pub struct Permit<'a> {
    breaker: &'a CircuitBreaker,
    probe: bool,
    recorded: bool,
}

impl<'a> Permit<'a> {
    fn new(breaker: &'a CircuitBreaker, probe: bool) -> Self {
        Self {
            breaker,
            probe,
            recorded: false,
        }
    }

    /// True if this call is the half-open probe.
    pub fn is_probe(&self) -> bool {
        self.probe
    }

    pub fn record_success(mut self) {
        self.recorded = true;
        self.breaker.on_success(self.probe);
    }

    pub fn record_failure(mut self) {
        self.recorded = true;
        self.breaker.on_failure(self.probe);
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        if !self.recorded {
            self.breaker.release(self.probe);
        }
    }
}

/// Fails fast while the breaker is open and records outcomes otherwise.
///
/// Transport errors and 5xx responses count as failures; any other
/// response, 4xx included, counts as success. Cancellation records nothing.
pub struct CircuitBreakerTransport<T> {
    inner: T,
    breaker: Arc<CircuitBreaker>,
}

impl<T> CircuitBreakerTransport<T> {
    pub fn new(inner: T, breaker: Arc<CircuitBreaker>) -> Self {
        Self { inner, breaker }
    }

    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }
}

#[async_trait]
impl<T: Transport> Transport for CircuitBreakerTransport<T> {
    async fn send(&self, ctx: &RequestContext, request: &Request) -> Result<Response> {
        ctx.check()?;

        let permit = self.breaker.try_acquire()?;
        let outcome = self.inner.send(ctx, request).await;

        match &outcome {
            Ok(response) if response.is_server_error() => permit.record_failure(),
            Ok(_) => permit.record_success(),
            Err(e) if e.is_cancellation() => drop(permit),
            Err(_) => permit.record_failure(),
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breaker(threshold: u32) -> CircuitBreaker {
        CircuitBreaker::new(CircuitBreakerConfig::new(threshold, Duration::from_secs(30)))
    }

    fn fail(cb: &CircuitBreaker) {
        cb.try_acquire().unwrap().record_failure();
    }

    fn succeed(cb: &CircuitBreaker) {
        cb.try_acquire().unwrap().record_success();
    }

    #[tokio::test(start_paused = true)]
    async fn test_circuit_breaker_opens_after_failures() {
        let cb = breaker(3);

        assert_eq!(cb.state(), CircuitState::Closed);
        fail(&cb);
        fail(&cb);
        assert_eq!(cb.state(), CircuitState::Closed);

        fail(&cb);
        assert_eq!(cb.state(), CircuitState::Open);
        assert!(matches!(cb.try_acquire(), Err(HttpClientError::CircuitOpen)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_circuit_breaker_success_resets_failures() {
        let cb = breaker(3);

        fail(&cb);
        fail(&cb);
        succeed(&cb);
        assert_eq!(cb.failure_count(), 0);

        fail(&cb);
        fail(&cb);
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_half_open_after_reset_timeout() {
        let cb = breaker(1);
        fail(&cb);
        assert_eq!(cb.state(), CircuitState::Open);

        tokio::time::advance(Duration::from_secs(29)).await;
        assert!(cb.try_acquire().is_err());

        tokio::time::advance(Duration::from_secs(2)).await;
        let probe = cb.try_acquire().unwrap();
        assert!(probe.is_probe());
        assert_eq!(cb.state(), CircuitState::HalfOpen);

        // only one probe at a time
        assert!(matches!(cb.try_acquire(), Err(HttpClientError::CircuitOpen)));

        probe.record_success();
        assert_eq!(cb.state(), CircuitState::Closed);
        assert!(!cb.try_acquire().unwrap().is_probe());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_probe_reopens() {
        let cb = breaker(2);
        fail(&cb);
        fail(&cb);

        tokio::time::advance(Duration::from_secs(31)).await;
        cb.try_acquire().unwrap().record_failure();
        assert_eq!(cb.state(), CircuitState::Open);

        // the reset timeout restarts from the probe failure
        assert!(cb.try_acquire().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_probe_frees_slot() {
        let cb = breaker(1);
        fail(&cb);
        tokio::time::advance(Duration::from_secs(31)).await;

        let probe = cb.try_acquire().unwrap();
        drop(probe);
        assert_eq!(cb.state(), CircuitState::HalfOpen);

        let next = cb.try_acquire().unwrap();
        assert!(next.is_probe());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_outcome_does_not_move_open_circuit() {
        let cb = breaker(1);
        let slow = cb.try_acquire().unwrap();
        fail(&cb);
        assert_eq!(cb.state(), CircuitState::Open);

        slow.record_success();
        assert_eq!(cb.state(), CircuitState::Open);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset() {
        let cb = breaker(1);
        fail(&cb);
        cb.reset();
        assert_eq!(cb.state(), CircuitState::Closed);
        assert_eq!(cb.failure_count(), 0);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(CircuitState::Closed.to_string(), "closed");
        assert_eq!(CircuitState::Open.to_string(), "open");
        assert_eq!(CircuitState::HalfOpen.to_string(), "half-open");
    }
}
