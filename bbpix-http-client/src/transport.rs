//! The request sender abstraction and the reqwest-backed base sender.

use crate::{HttpClientConfig, HttpClientError, Request, RequestContext, Response, Result};
use async_trait::async_trait;
use http::{HeaderMap, HeaderName, HeaderValue};
use std::sync::Arc;

/// Sends one request and returns its response.
///
/// Every pipeline stage implements this and wraps another implementation.
/// Non-2xx statuses are responses, not errors.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, ctx: &RequestContext, request: &Request) -> Result<Response>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, ctx: &RequestContext, request: &Request) -> Result<Response> {
        (**self).send(ctx, request).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
    async fn send(&self, ctx: &RequestContext, request: &Request) -> Result<Response> {
        (**self).send(ctx, request).await
    }
}

/// Performs the network I/O.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a reqwest client from `config`.
    pub fn new(config: &HttpClientConfig) -> Result<Self> {
        let mut default_headers = HeaderMap::new();
        for (name, value) in &config.default_headers {
            let name = HeaderName::try_from(name.as_str())
                .map_err(|e| HttpClientError::Config(format!("invalid header name {name}: {e}")))?;
            let value = HeaderValue::try_from(value.as_str())
                .map_err(|e| HttpClientError::Config(format!("invalid header value: {e}")))?;
            default_headers.insert(name, value);
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent)
            .default_headers(default_headers)
            .gzip(config.gzip)
            .build()?;

        Ok(Self { client })
    }

    /// Use an already configured client.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Get the underlying reqwest client.
    pub fn inner(&self) -> &reqwest::Client {
        &self.client
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, ctx: &RequestContext, request: &Request) -> Result<Response> {
        ctx.check()?;

        let mut builder = self
            .client
            .request(request.method().clone(), request.url().clone())
            .headers(request.headers().clone());
        if let Some(body) = request.body() {
            builder = builder.body(body.clone());
        }

        ctx.run(async move {
            let response = builder.send().await?;
            Response::from_reqwest(response).await
        })
        .await
    }
}
