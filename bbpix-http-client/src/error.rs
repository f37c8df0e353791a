//! HTTP client error types.

use bbpix_auth::AuthError;
use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Result type for HTTP client operations.
pub type Result<T> = std::result::Result<T, HttpClientError>;

/// HTTP client errors.
#[derive(Debug, Error)]
pub enum HttpClientError {
    /// Every attempt allowed by the retry policy failed.
    #[error("max retries exceeded after {attempts} attempts: {source}")]
    RetryExhausted {
        /// Number of attempts made.
        attempts: u32,
        /// Outcome of the last attempt.
        #[source]
        source: Box<HttpClientError>,
    },

    /// Circuit breaker is open, rejecting requests.
    #[error("circuit breaker is open, request rejected")]
    CircuitOpen,

    /// The caller cancelled the request.
    #[error("request cancelled")]
    Cancelled,

    /// The caller's deadline passed before the request completed.
    #[error("request deadline exceeded")]
    DeadlineExceeded,

    /// Token acquisition failed.
    #[error("failed to obtain access token: {0}")]
    Auth(#[from] AuthError),

    /// Non-2xx response from the API.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Connection error.
    #[error("connection error: {0}")]
    Connection(String),

    /// Invalid URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Request building error.
    #[error("failed to build request: {0}")]
    RequestBuild(String),

    /// Invalid client or pipeline configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Underlying HTTP client error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl HttpClientError {
    /// Network-level failure with no response obtained.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Connection(_))
    }

    /// Caller cancellation or deadline expiry.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }

    pub fn is_circuit_open(&self) -> bool {
        matches!(self, Self::CircuitOpen)
    }

    /// Check if this is a timeout error.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::DeadlineExceeded) || matches!(self, Self::Http(e) if e.is_timeout())
    }

    /// The API error in this error's chain, if any.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(e) => Some(e),
            Self::RetryExhausted { source, .. } => source.api_error(),
            _ => None,
        }
    }

    /// Get the HTTP status code if a response was received.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Auth(e) => e.status_code(),
            Self::RetryExhausted { source, .. } => source.status_code(),
            other => other.api_error().map(|e| e.status),
        }
    }
}

/// A field-level problem reported by the API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub message: String,
}

impl ErrorDetail {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Error returned by the BB API for a non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: u16,
    pub message: String,
    pub details: Vec<ErrorDetail>,
    /// Raw response body.
    pub body: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

impl ApiError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: Vec::new(),
            body: String::new(),
        }
    }

    pub fn with_detail(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.details.push(ErrorDetail::new(field, message));
        self
    }

    /// Decode `{"message": ..., "errors": [{"field", "message"}]}`.
    ///
    /// Bodies that are not in that shape, or carry no message, fall back to
    /// `HTTP <status>`.
    pub fn from_body(status: u16, body: &[u8]) -> Self {
        let raw = String::from_utf8_lossy(body).into_owned();
        let parsed = serde_json::from_slice::<ErrorBody>(body).ok();

        let (message, details) = match parsed {
            Some(b) if !b.message.is_empty() => (b.message, b.errors),
            Some(b) => (format!("HTTP {status}"), b.errors),
            None => (format!("HTTP {status}"), Vec::new()),
        };

        Self {
            status,
            message,
            details,
            body: raw,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "API error ({}): {}", self.status, self.message)?;
        if !self.details.is_empty() {
            let details: Vec<String> = self.details.iter().map(ToString::to_string).collect();
            write!(f, " [{}]", details.join("; "))?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display_without_details() {
        let err = ApiError::new(404, "Not Found");
        assert_eq!(err.to_string(), "API error (404): Not Found");
    }

    #[test]
    fn test_api_error_display_with_details() {
        let err = ApiError::new(400, "Bad Request")
            .with_detail("valor", "must be positive")
            .with_detail("chave", "is required");
        assert_eq!(
            err.to_string(),
            "API error (400): Bad Request [valor: must be positive; chave: is required]"
        );
    }

    #[test]
    fn test_from_body_parses_message_and_details() {
        let body = br#"{"message":"Invalid request","errors":[{"field":"txid","message":"invalid format"}]}"#;
        let err = ApiError::from_body(400, body);
        assert_eq!(err.message, "Invalid request");
        assert_eq!(err.details, vec![ErrorDetail::new("txid", "invalid format")]);
        assert_eq!(err.body, String::from_utf8_lossy(body));
    }

    #[test]
    fn test_from_body_falls_back_to_status() {
        let err = ApiError::from_body(500, b"<html>oops</html>");
        assert_eq!(err.message, "HTTP 500");
        assert!(err.details.is_empty());
        assert_eq!(err.body, "<html>oops</html>");

        let err = ApiError::from_body(422, br#"{"errors":[]}"#);
        assert_eq!(err.message, "HTTP 422");
    }

    #[test]
    fn test_api_error_found_through_retry_exhaustion() {
        let err = HttpClientError::RetryExhausted {
            attempts: 4,
            source: Box::new(HttpClientError::Api(ApiError::new(503, "unavailable"))),
        };
        assert_eq!(err.api_error().map(|e| e.status), Some(503));
        assert_eq!(err.status_code(), Some(503));
        assert!(
            err.to_string()
                .starts_with("max retries exceeded after 4 attempts")
        );
    }

    #[test]
    fn test_error_kinds() {
        assert!(HttpClientError::Connection("refused".into()).is_transport());
        assert!(HttpClientError::Cancelled.is_cancellation());
        assert!(HttpClientError::DeadlineExceeded.is_cancellation());
        assert!(HttpClientError::DeadlineExceeded.is_timeout());
        assert!(HttpClientError::CircuitOpen.is_circuit_open());
        assert!(!HttpClientError::CircuitOpen.is_transport());
    }
}
