// Error types for token acquisition

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    /// The identity endpoint could not be reached or the body could not be read.
    #[error("token request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The identity endpoint answered with a non-200 status.
    #[error("token request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    /// The identity endpoint answered 200 with a body that is not a token.
    #[error("failed to decode token response: {0}")]
    InvalidResponse(#[source] serde_json::Error),

    #[error("invalid auth configuration: {0}")]
    Config(String),
}

impl AuthError {
    /// HTTP status returned by the identity endpoint, if one was received.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;
