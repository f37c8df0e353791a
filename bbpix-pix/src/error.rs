//! Error types for PIX operations

use bbpix_http_client::{ApiError, HttpClientError};
use thiserror::Error;

/// PIX operation errors
#[derive(Error, Debug)]
pub enum PixError {
    /// Input rejected before any request was sent
    #[error("validation error: {0}")]
    Validation(String),

    /// The request failed in transport or was rejected by the API
    #[error("failed to {operation}: {source}")]
    Request {
        operation: &'static str,
        #[source]
        source: HttpClientError,
    },
}

impl PixError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn request(operation: &'static str) -> impl FnOnce(HttpClientError) -> Self {
        move |source| Self::Request { operation, source }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// The API error behind this failure, if the API answered.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Request { source, .. } => source.api_error(),
            Self::Validation(_) => None,
        }
    }

    /// The transport error behind this failure.
    pub fn http_error(&self) -> Option<&HttpClientError> {
        match self {
            Self::Request { source, .. } => Some(source),
            Self::Validation(_) => None,
        }
    }
}

/// Result type for PIX operations
pub type PixResult<T> = std::result::Result<T, PixError>;
