//! # bbpix
//!
//! Client for the Banco do Brasil PIX API.
//!
//! Every call travels through a fixed pipeline:
//!
//! ```text
//! logging -> auth -> retry -> circuit breaker -> network
//! ```
//!
//! - **Auth** attaches a cached OAuth2 client-credentials token and the
//!   developer application key. Concurrent callers share a single token
//!   refresh, and a `401` drops the cached token.
//! - **Retry** re-sends idempotent requests on `429`/`502`/`503`/`504` and
//!   connection errors, with exponential back-off and ±25% jitter.
//! - **Circuit breaker** fails fast after consecutive failures and lets a
//!   single probe through once the reset timeout has elapsed.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bbpix::{Client, ClientOptions, Config, RequestContext};
//! use bbpix::pix::{CreateQRCodeRequest, Decimal};
//!
//! # async fn example() -> bbpix::Result<()> {
//! bbpix::init_logging()?;
//!
//! let client = Client::new(Config::from_dotenv()?, ClientOptions::default())?;
//! let ctx = RequestContext::with_timeout(std::time::Duration::from_secs(10));
//!
//! let request = CreateQRCodeRequest::new(
//!     "7978c0c97ea847e78e8849634473c1f1",
//!     "chave@example.com",
//!     Decimal::new(1000, 2),
//! );
//! let charge = client.pix().create_qr_code(&ctx, &request).await?;
//! println!("{:?}", charge.copy_paste);
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! | Variable | Meaning |
//! |----------|---------|
//! | `BB_ENVIRONMENT` | `sandbox`, `homologacao` or `producao` |
//! | `BB_CLIENT_ID` | OAuth2 client ID |
//! | `BB_CLIENT_SECRET` | OAuth2 client secret |
//! | `BB_DEV_APP_KEY` | Developer application key |
//! | `BB_LOG_LEVEL` | Log filter when `RUST_LOG` is unset |
//! | `BB_LOG_FORMAT` | `text` or `json` |

mod client;
mod config;
mod error;
mod logging;
mod options;

pub use client::Client;
pub use config::{
    Config, ENV_CLIENT_ID, ENV_CLIENT_SECRET, ENV_DEV_APP_KEY, ENV_ENVIRONMENT, Environment,
};
pub use error::{Error, Result};
pub use logging::{
    ENV_LOG_FORMAT, ENV_LOG_LEVEL, LogFormat, env_filter, init_logging, init_logging_with,
};
pub use options::{ClientOptions, ClientOptionsBuilder, Endpoints};

pub use bbpix_auth as auth;
pub use bbpix_http_client as http;
pub use bbpix_http_client::{
    ApiError, CancellationToken, CircuitState, ErrorDetail, HttpClientError, RequestContext,
};

/// PIX resource types.
pub mod pix {
    pub use bbpix_pix::*;
}
