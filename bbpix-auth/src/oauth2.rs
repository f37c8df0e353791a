// OAuth2 client-credentials provider

use crate::{AuthError, Result, Token, TokenProvider};
use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Settings for [`OAuth2Provider`].
pub struct OAuth2Config {
    pub token_url: String,
    pub client_id: String,
    pub client_secret: SecretString,
    /// Timeout applied to the token request.
    pub timeout: Duration,
}

impl OAuth2Config {
    pub fn new(
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            token_url: token_url.into(),
            client_id: client_id.into(),
            client_secret: SecretString::new(client_secret.into().into()),
            timeout: Duration::from_secs(30),
        }
    }

    /// Set the token request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.token_url.is_empty() {
            return Err(AuthError::Config("token URL is required".into()));
        }
        if self.client_id.is_empty() {
            return Err(AuthError::Config("client ID is required".into()));
        }
        if self.client_secret.expose_secret().is_empty() {
            return Err(AuthError::Config("client secret is required".into()));
        }
        Ok(())
    }
}

impl fmt::Debug for OAuth2Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuth2Config")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Fetches tokens with the client-credentials grant and caches them.
///
/// Reads of a valid cached token only take the shared lock. Callers that
/// find the cache empty or expired queue on `refresh`, and the first one
/// through fetches while the rest reuse its result after re-checking.
pub struct OAuth2Provider {
    config: OAuth2Config,
    client: Client,
    token: RwLock<Option<Token>>,
    refresh: Mutex<()>,
}

impl OAuth2Provider {
    /// Create a provider with its own HTTP client.
    pub fn new(config: OAuth2Config) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Self::with_client(config, client)
    }

    /// Create a provider that sends token requests through `client`.
    pub fn with_client(config: OAuth2Config, client: Client) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            client,
            token: RwLock::new(None),
            refresh: Mutex::new(()),
        })
    }

    pub fn token_url(&self) -> &str {
        &self.config.token_url
    }

    /// The cached token, if it is still valid.
    pub fn cached(&self) -> Option<Token> {
        self.token
            .read()
            .as_ref()
            .filter(|t| !t.is_expired())
            .cloned()
    }

    async fn fetch(&self) -> Result<Token> {
        debug!(token_url = %self.config.token_url, "Requesting OAuth2 token");

        let response = self
            .client
            .post(&self.config.token_url)
            .basic_auth(
                &self.config.client_id,
                Some(self.config.client_secret.expose_secret()),
            )
            .form(&[("grant_type", "client_credentials")])
            .timeout(self.config.timeout)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status != StatusCode::OK {
            return Err(AuthError::Status {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str::<Token>(&body).map_err(AuthError::InvalidResponse)
    }
}

#[async_trait]
impl TokenProvider for OAuth2Provider {
    async fn get_token(&self) -> Result<Token> {
        if let Some(token) = self.cached() {
            return Ok(token);
        }

        let _refresh = self.refresh.lock().await;

        // Another caller may have refreshed while we waited.
        if let Some(token) = self.cached() {
            return Ok(token);
        }

        match self.fetch().await {
            Ok(token) => {
                info!(
                    token_type = %token.token_type,
                    expires_in = token.expires_in,
                    "OAuth2 token refreshed"
                );
                *self.token.write() = Some(token.clone());
                Ok(token)
            }
            Err(e) => {
                warn!(error = %e, "OAuth2 token request failed");
                *self.token.write() = None;
                Err(e)
            }
        }
    }

    fn invalidate(&self) {
        debug!("Invalidating cached OAuth2 token");
        *self.token.write() = None;
    }
}

impl fmt::Debug for OAuth2Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuth2Provider")
            .field("config", &self.config)
            .field("cached", &self.token.read().is_some())
            .finish()
    }
}
