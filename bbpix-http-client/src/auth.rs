//! Credential injection stage.

use crate::{HttpClientError, Request, RequestContext, Response, Result, Transport};
use async_trait::async_trait;
use bbpix_auth::TokenProvider;
use http::{HeaderName, HeaderValue, StatusCode, header};
use std::sync::Arc;
use tracing::warn;

/// Header carrying the developer application key.
pub const DEFAULT_APP_KEY_HEADER: &str = "gw-dev-app-key";

/// Adds `Authorization` and the application key header to every request.
///
/// A 401 from downstream invalidates the cached token so the next request
/// fetches a fresh one. The 401 itself is returned to the caller.
pub struct AuthTransport<T> {
    inner: T,
    provider: Arc<dyn TokenProvider>,
    app_key_header: HeaderName,
    app_key: HeaderValue,
}

impl<T> AuthTransport<T> {
    pub fn new(inner: T, provider: Arc<dyn TokenProvider>, app_key: &str) -> Result<Self> {
        let app_key = HeaderValue::try_from(app_key)
            .map_err(|e| HttpClientError::Config(format!("invalid application key: {e}")))?;

        Ok(Self {
            inner,
            provider,
            app_key_header: HeaderName::from_static(DEFAULT_APP_KEY_HEADER),
            app_key,
        })
    }

    /// Send the application key under a different header name.
    pub fn with_header_name(mut self, name: &str) -> Result<Self> {
        self.app_key_header = HeaderName::try_from(name)
            .map_err(|e| HttpClientError::Config(format!("invalid header name {name}: {e}")))?;
        Ok(self)
    }
}

#[async_trait]
impl<T: Transport> Transport for AuthTransport<T> {
    async fn send(&self, ctx: &RequestContext, request: &Request) -> Result<Response> {
        ctx.check()?;

        let token = ctx
            .run(async { self.provider.get_token().await.map_err(HttpClientError::from) })
            .await?;

        let mut authorization = HeaderValue::try_from(token.authorization()).map_err(|e| {
            HttpClientError::RequestBuild(format!("invalid authorization header: {e}"))
        })?;
        authorization.set_sensitive(true);

        let mut request = request.clone();
        let headers = request.headers_mut();
        headers.insert(header::AUTHORIZATION, authorization);
        headers.insert(self.app_key_header.clone(), self.app_key.clone());

        let response = self.inner.send(ctx, &request).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            warn!(
                method = %request.method(),
                url = %request.url(),
                "Unauthorized response, invalidating cached token"
            );
            self.provider.invalidate();
        }

        Ok(response)
    }
}
