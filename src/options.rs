//! Tunables for [`crate::Client`].

use bbpix_http_client::DEFAULT_APP_KEY_HEADER;
use std::time::Duration;
use tracing::Level;

/// Explicit token and API URLs, replacing the ones derived from the
/// environment. Useful for pointing the client at a local mock server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub token_url: String,
    pub api_url: String,
}

impl Endpoints {
    pub fn new(token_url: impl Into<String>, api_url: impl Into<String>) -> Self {
        Self {
            token_url: token_url.into(),
            api_url: api_url.into(),
        }
    }
}

/// Client options.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Timeout for a single HTTP attempt, token requests included.
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Retries after the first attempt for idempotent requests.
    pub max_retries: u32,
    /// Back-off before the first retry; doubled on each further retry.
    pub initial_backoff: Duration,
    /// Consecutive failures that open the circuit.
    pub failure_threshold: u32,
    /// How long the circuit stays open before a probe is let through.
    pub reset_timeout: Duration,
    pub user_agent: String,
    /// Level of the per-request log event.
    pub log_level: Level,
    /// Header carrying the developer application key.
    pub app_key_header: String,
    /// Use this client instead of building one. Its own timeouts and user
    /// agent apply.
    pub http_client: Option<reqwest::Client>,
    pub endpoints: Option<Endpoints>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            max_retries: 3,
            initial_backoff: Duration::from_millis(100),
            failure_threshold: 5,
            reset_timeout: Duration::from_secs(60),
            user_agent: format!("bbpix-rs/{}", env!("CARGO_PKG_VERSION")),
            log_level: Level::INFO,
            app_key_header: DEFAULT_APP_KEY_HEADER.to_string(),
            http_client: None,
            endpoints: None,
        }
    }
}

impl ClientOptions {
    pub fn builder() -> ClientOptionsBuilder {
        ClientOptionsBuilder::default()
    }
}

/// Builder for [`ClientOptions`].
#[derive(Debug, Default)]
pub struct ClientOptionsBuilder {
    options: ClientOptions,
}

impl ClientOptionsBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = timeout;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.options.connect_timeout = timeout;
        self
    }

    /// Retry budget and initial back-off.
    pub fn retry(mut self, max_retries: u32, initial_backoff: Duration) -> Self {
        self.options.max_retries = max_retries;
        self.options.initial_backoff = initial_backoff;
        self
    }

    /// Breaker threshold and reset timeout.
    pub fn circuit_breaker(mut self, failure_threshold: u32, reset_timeout: Duration) -> Self {
        self.options.failure_threshold = failure_threshold;
        self.options.reset_timeout = reset_timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.options.user_agent = user_agent.into();
        self
    }

    pub fn log_level(mut self, level: Level) -> Self {
        self.options.log_level = level;
        self
    }

    pub fn app_key_header(mut self, name: impl Into<String>) -> Self {
        self.options.app_key_header = name.into();
        self
    }

    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.options.http_client = Some(client);
        self
    }

    pub fn endpoints(mut self, endpoints: Endpoints) -> Self {
        self.options.endpoints = Some(endpoints);
        self
    }

    pub fn build(self) -> ClientOptions {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ClientOptions::default();
        assert_eq!(options.timeout, Duration::from_secs(30));
        assert_eq!(options.connect_timeout, Duration::from_secs(10));
        assert_eq!(options.max_retries, 3);
        assert_eq!(options.initial_backoff, Duration::from_millis(100));
        assert_eq!(options.failure_threshold, 5);
        assert_eq!(options.reset_timeout, Duration::from_secs(60));
        assert!(options.user_agent.starts_with("bbpix-rs/"));
        assert_eq!(options.log_level, Level::INFO);
        assert_eq!(options.app_key_header, "gw-dev-app-key");
        assert!(options.http_client.is_none());
        assert!(options.endpoints.is_none());
    }

    #[test]
    fn test_builder_overrides() {
        let options = ClientOptions::builder()
            .timeout(Duration::from_secs(5))
            .retry(5, Duration::from_millis(250))
            .circuit_breaker(2, Duration::from_secs(10))
            .user_agent("my-app/1.0")
            .log_level(Level::DEBUG)
            .app_key_header("gw-app-key")
            .endpoints(Endpoints::new("http://localhost/token", "http://localhost/api"))
            .build();

        assert_eq!(options.timeout, Duration::from_secs(5));
        assert_eq!(options.max_retries, 5);
        assert_eq!(options.initial_backoff, Duration::from_millis(250));
        assert_eq!(options.failure_threshold, 2);
        assert_eq!(options.reset_timeout, Duration::from_secs(10));
        assert_eq!(options.user_agent, "my-app/1.0");
        assert_eq!(options.log_level, Level::DEBUG);
        assert_eq!(options.app_key_header, "gw-app-key");
        assert_eq!(options.endpoints.unwrap().api_url, "http://localhost/api");
        // untouched fields keep their defaults
        assert_eq!(options.connect_timeout, Duration::from_secs(10));
    }
}
