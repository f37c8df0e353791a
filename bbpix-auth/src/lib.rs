//! OAuth2 credentials for the BB PIX API.
//!
//! [`OAuth2Provider`] performs the client-credentials exchange against the
//! bank's identity endpoint and caches the resulting [`Token`] until it is
//! within [`EXPIRY_MARGIN`] of expiring. Concurrent callers that miss the
//! cache share a single fetch.
//!
//! ```rust,no_run
//! use bbpix_auth::{OAuth2Config, OAuth2Provider, TokenProvider};
//!
//! # async fn run() -> bbpix_auth::Result<()> {
//! let provider = OAuth2Provider::new(OAuth2Config::new(
//!     "https://oauth.sandbox.bb.com.br/oauth/token",
//!     "client-id",
//!     "client-secret",
//! ))?;
//!
//! let token = provider.get_token().await?;
//! println!("{}", token.token_type);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod oauth2;
pub mod provider;
pub mod token;

pub use error::{AuthError, Result};
pub use oauth2::{OAuth2Config, OAuth2Provider};
pub use provider::TokenProvider;
pub use token::{EXPIRY_MARGIN, Token};
