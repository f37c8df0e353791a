//! Top-level error type

use bbpix_auth::AuthError;
use bbpix_http_client::{ApiError, HttpClientError};
use bbpix_pix::PixError;
use thiserror::Error;

/// Errors raised while configuring or building a [`crate::Client`].
///
/// Per-call errors come back as [`PixError`]; this type wraps them too so
/// applications can funnel everything through one `?`.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid or incomplete configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A required environment variable is missing or empty
    #[error("{0} environment variable is required")]
    MissingEnv(&'static str),

    /// Unknown environment name
    #[error("invalid environment: {0} (must be sandbox, homologacao, or producao)")]
    InvalidEnvironment(String),

    /// The `.env` file could not be read
    #[error("failed to load .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Http(#[from] HttpClientError),

    #[error(transparent)]
    Pix(#[from] PixError),
}

impl Error {
    /// The API error behind this failure, if the API answered.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Http(e) => e.api_error(),
            Self::Pix(e) => e.api_error(),
            _ => None,
        }
    }

    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::MissingEnv(_) | Self::InvalidEnvironment(_) | Self::Dotenv(_)
        )
    }
}

/// Result type for client setup
pub type Result<T> = std::result::Result<T, Error>;
