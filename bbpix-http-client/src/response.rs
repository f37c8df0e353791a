//! HTTP response wrapper.

use crate::{ApiError, Result};
use bytes::Bytes;
use http::{Extensions, HeaderMap, HeaderName, HeaderValue, StatusCode};
use serde::de::DeserializeOwned;

/// A response with its body fully buffered.
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    url: Option<url::Url>,
    extensions: Extensions,
}

impl Response {
    /// Build a response by hand, as a transport that does no I/O would.
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
            url: None,
            extensions: Extensions::new(),
        }
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Buffer a reqwest response.
    pub(crate) async fn from_reqwest(response: reqwest::Response) -> Result<Self> {
        let status = response.status();
        let headers = response.headers().clone();
        let url = response.url().clone();
        let body = response.bytes().await?;

        Ok(Self {
            status,
            headers,
            body,
            url: Some(url),
            extensions: Extensions::new(),
        })
    }

    /// Get the status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Check if the response was successful (2xx).
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Check if the response was a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        self.status.is_server_error()
    }

    /// Get the response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get a specific header value.
    pub fn header(&self, name: impl AsRef<str>) -> Option<&str> {
        self.headers
            .get(name.as_ref())
            .and_then(|v| v.to_str().ok())
    }

    /// Final URL, when the response came off the wire.
    pub fn url(&self) -> Option<&url::Url> {
        self.url.as_ref()
    }

    /// Get the response body as bytes.
    pub fn bytes(&self) -> &Bytes {
        &self.body
    }

    /// Consume the response and return the body as bytes.
    pub fn into_bytes(self) -> Bytes {
        self.body
    }

    /// Body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Parse the response body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }

    /// Turn any non-2xx status into an [`ApiError`].
    pub fn error_for_status(self) -> Result<Self> {
        if self.status.is_success() {
            Ok(self)
        } else {
            Err(ApiError::from_body(self.status.as_u16(), &self.body).into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HttpClientError;

    #[test]
    fn test_error_for_status_passes_success() {
        let response = Response::new(StatusCode::CREATED, "{}");
        assert!(response.error_for_status().is_ok());
    }

    #[test]
    fn test_error_for_status_decodes_api_error() {
        let response = Response::new(
            StatusCode::BAD_REQUEST,
            r#"{"message":"Bad Request","errors":[{"field":"valor","message":"invalid"}]}"#,
        );
        match response.error_for_status() {
            Err(HttpClientError::Api(e)) => {
                assert_eq!(e.status, 400);
                assert_eq!(e.message, "Bad Request");
                assert_eq!(e.details.len(), 1);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_json_decoding_error() {
        let response = Response::new(StatusCode::OK, "not json");
        let err = response.json::<serde_json::Value>().unwrap_err();
        assert!(matches!(err, HttpClientError::Json(_)));
    }

    #[test]
    fn test_header_lookup() {
        let response = Response::new(StatusCode::OK, "")
            .with_header(http::header::RETRY_AFTER, HeaderValue::from_static("5"));
        assert_eq!(response.header("retry-after"), Some("5"));
        assert_eq!(response.header("x-missing"), None);
    }
}
