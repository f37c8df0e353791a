//! Composes the stages into one request sender.

use crate::{
    AuthTransport, CircuitBreaker, CircuitBreakerConfig, CircuitBreakerTransport, CircuitState,
    DEFAULT_APP_KEY_HEADER, HttpClientError, Jitter, LoggingTransport, RandomJitter, Request,
    RequestContext, Response, Result, RetryConfig, RetryTransport, Transport,
};
use async_trait::async_trait;
use bbpix_auth::TokenProvider;
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;

/// Builder for [`Pipeline`].
pub struct PipelineBuilder {
    retry: RetryConfig,
    circuit_breaker: CircuitBreakerConfig,
    token_provider: Option<Arc<dyn TokenProvider>>,
    app_key: Option<String>,
    app_key_header: String,
    jitter: Option<Arc<dyn Jitter>>,
    log_level: Level,
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            circuit_breaker: CircuitBreakerConfig::default(),
            token_provider: None,
            app_key: None,
            app_key_header: DEFAULT_APP_KEY_HEADER.to_string(),
            jitter: None,
            log_level: Level::INFO,
        }
    }
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set retry configuration.
    pub fn retry(mut self, config: RetryConfig) -> Self {
        self.retry = config;
        self
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.retry.max_retries = max_retries;
        self
    }

    pub fn initial_backoff(mut self, backoff: Duration) -> Self {
        self.retry.initial_backoff = backoff;
        self
    }

    /// Set circuit breaker configuration.
    pub fn circuit_breaker(mut self, config: CircuitBreakerConfig) -> Self {
        self.circuit_breaker = config;
        self
    }

    pub fn failure_threshold(mut self, threshold: u32) -> Self {
        self.circuit_breaker.failure_threshold = threshold;
        self
    }

    pub fn reset_timeout(mut self, timeout: Duration) -> Self {
        self.circuit_breaker.reset_timeout = timeout;
        self
    }

    pub fn token_provider(mut self, provider: Arc<dyn TokenProvider>) -> Self {
        self.token_provider = Some(provider);
        self
    }

    /// Static application key sent with every request.
    pub fn app_key(mut self, key: impl Into<String>) -> Self {
        self.app_key = Some(key.into());
        self
    }

    pub fn app_key_header(mut self, name: impl Into<String>) -> Self {
        self.app_key_header = name.into();
        self
    }

    /// Replace the backoff jitter source.
    pub fn jitter(mut self, jitter: Arc<dyn Jitter>) -> Self {
        self.jitter = Some(jitter);
        self
    }

    /// Level of the per-request log event.
    pub fn log_level(mut self, level: Level) -> Self {
        self.log_level = level;
        self
    }

    /// Wrap `base` as logging(auth(retry(circuit_breaker(base)))).
    pub fn build<T: Transport + 'static>(self, base: T) -> Result<Pipeline> {
        let provider = self
            .token_provider
            .ok_or_else(|| HttpClientError::Config("token provider is required".into()))?;
        let app_key = self
            .app_key
            .filter(|key| !key.is_empty())
            .ok_or_else(|| HttpClientError::Config("application key is required".into()))?;
        if self.circuit_breaker.failure_threshold == 0 {
            return Err(HttpClientError::Config(
                "circuit breaker failure threshold must be at least 1".into(),
            ));
        }

        let breaker = Arc::new(CircuitBreaker::new(self.circuit_breaker));
        let jitter = self
            .jitter
            .unwrap_or_else(|| Arc::new(RandomJitter::new()));

        let transport = CircuitBreakerTransport::new(base, Arc::clone(&breaker));
        let transport = RetryTransport::new(transport, self.retry).with_jitter(jitter);
        let transport = AuthTransport::new(transport, provider, &app_key)?
            .with_header_name(&self.app_key_header)?;
        let transport = LoggingTransport::new(transport).with_level(self.log_level);

        Ok(Pipeline {
            transport: Arc::new(transport),
            breaker,
        })
    }
}

/// The composed sender. Cheap to clone; clones share the breaker.
#[derive(Clone)]
pub struct Pipeline {
    transport: Arc<dyn Transport>,
    breaker: Arc<CircuitBreaker>,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    pub fn circuit_state(&self) -> CircuitState {
        self.breaker.state()
    }
}

#[async_trait]
impl Transport for Pipeline {
    async fn send(&self, ctx: &RequestContext, request: &Request) -> Result<Response> {
        self.transport.send(ctx, request).await
    }
}
