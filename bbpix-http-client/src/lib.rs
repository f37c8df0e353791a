//! # BB PIX HTTP Client
//!
//! The transport pipeline used by the BB PIX client. Each stage implements
//! [`Transport`] and wraps the next one:
//!
//! ```text
//! logging -> auth -> retry -> circuit breaker -> reqwest
//! ```
//!
//! - **Auth**: injects the bearer token and the application key, and
//!   invalidates the cached token on `401`.
//! - **Retry**: re-issues idempotent requests on transport errors and on
//!   `429/502/503/504`, with exponential backoff and jitter.
//! - **Circuit breaker**: opens after consecutive failures and lets a
//!   single probe through after the reset timeout.
//! - **Logging**: one `tracing` event per request with its outcome.
//!
//! Every stage honours the caller's [`RequestContext`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bbpix_auth::{OAuth2Config, OAuth2Provider};
//! use bbpix_http_client::{HttpClient, HttpClientConfig, Pipeline, ReqwestTransport, RequestContext};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = OAuth2Provider::new(OAuth2Config::new(
//!         "https://oauth.sandbox.bb.com.br/oauth/token",
//!         "client-id",
//!         "client-secret",
//!     ))?;
//!
//!     let pipeline = Pipeline::builder()
//!         .token_provider(Arc::new(provider))
//!         .app_key("developer-app-key")
//!         .build(ReqwestTransport::new(&HttpClientConfig::default())?)?;
//!
//!     let client = HttpClient::new(Arc::new(pipeline), "https://api.sandbox.bb.com.br/pix-bb/v1")?;
//!     let ctx = RequestContext::new();
//!     let body: serde_json::Value = client.get("/cob/abc").context(&ctx).send_json().await?;
//!     println!("{body}");
//!     Ok(())
//! }
//! ```

mod auth;
mod circuit_breaker;
mod client;
mod config;
mod context;
mod error;
mod logging;
mod pipeline;
mod request;
mod response;
mod retry;
mod transport;

pub use auth::{AuthTransport, DEFAULT_APP_KEY_HEADER};
pub use circuit_breaker::{
    CircuitBreaker, CircuitBreakerConfig, CircuitBreakerTransport, CircuitState, Permit,
};
pub use client::HttpClient;
pub use config::{HttpClientConfig, HttpClientConfigBuilder};
pub use context::RequestContext;
pub use error::{ApiError, ErrorDetail, HttpClientError, Result};
pub use logging::LoggingTransport;
pub use pipeline::{Pipeline, PipelineBuilder};
pub use request::{Request, RequestBuilder};
pub use response::Response;
pub use retry::{
    FixedJitter, JITTER_MAX, JITTER_MIN, Jitter, RandomJitter, RetryConfig, RetryTransport,
};
pub use transport::{ReqwestTransport, Transport};

// Re-export common types
pub use bytes::Bytes;
pub use http::{HeaderMap, HeaderValue, Method, StatusCode, header};
pub use tokio_util::sync::CancellationToken;
pub use url::Url;

/// Prelude for common imports.
///
/// ```
/// use bbpix_http_client::prelude::*;
/// ```
pub mod prelude {
    pub use crate::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
    pub use crate::client::HttpClient;
    pub use crate::context::RequestContext;
    pub use crate::error::{ApiError, HttpClientError, Result};
    pub use crate::pipeline::{Pipeline, PipelineBuilder};
    pub use crate::request::{Request, RequestBuilder};
    pub use crate::response::Response;
    pub use crate::retry::RetryConfig;
    pub use crate::transport::Transport;
    pub use http::{Method, StatusCode, header};
}
