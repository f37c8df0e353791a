//! Top-level client: credentials in, ready-to-use PIX resources out.

use bbpix_auth::{OAuth2Config, OAuth2Provider, TokenProvider};
use bbpix_http_client::{
    CircuitState, HttpClient, HttpClientConfig, Pipeline, ReqwestTransport, Transport,
};
use once_cell::sync::OnceCell;
use secrecy::ExposeSecret;
use std::fmt;
use std::sync::Arc;
use tracing::info;

use crate::{ClientOptions, Config, Environment, Result};

/// Banco do Brasil PIX client.
///
/// Requests go through one fixed chain: logging, then authentication, then
/// retry with back-off, then the circuit breaker, then the network. The
/// token cache and the breaker are shared by every resource handed out by
/// this client.
pub struct Client {
    environment: Environment,
    api_url: String,
    provider: Arc<OAuth2Provider>,
    pipeline: Pipeline,
    http: HttpClient,
    pix: OnceCell<bbpix_pix::Client>,
}

impl Client {
    /// Validate `config` and assemble the request pipeline.
    pub fn new(config: Config, options: ClientOptions) -> Result<Self> {
        config.validate()?;

        let (token_url, api_url) = match &options.endpoints {
            Some(endpoints) => (endpoints.token_url.clone(), endpoints.api_url.clone()),
            None => (
                config.environment.token_url().to_string(),
                config.environment.api_url().to_string(),
            ),
        };

        let base = match options.http_client.clone() {
            Some(client) => ReqwestTransport::from_client(client),
            None => ReqwestTransport::new(
                &HttpClientConfig::builder()
                    .timeout(options.timeout)
                    .connect_timeout(options.connect_timeout)
                    .user_agent(options.user_agent.as_str())
                    .build(),
            )?,
        };

        let oauth = OAuth2Config::new(
            token_url,
            config.client_id.as_str(),
            config.client_secret.expose_secret(),
        )
        .timeout(options.timeout);
        let provider = Arc::new(OAuth2Provider::with_client(oauth, base.inner().clone())?);

        let pipeline = Pipeline::builder()
            .max_retries(options.max_retries)
            .initial_backoff(options.initial_backoff)
            .failure_threshold(options.failure_threshold)
            .reset_timeout(options.reset_timeout)
            .token_provider(Arc::clone(&provider) as Arc<dyn TokenProvider>)
            .app_key(config.developer_app_key.as_str())
            .app_key_header(options.app_key_header.as_str())
            .log_level(options.log_level)
            .build(base)?;

        let http = HttpClient::new(Arc::new(pipeline.clone()) as Arc<dyn Transport>, &api_url)?;

        info!(
            environment = %config.environment,
            api_url = %api_url,
            "Banco do Brasil PIX client ready"
        );

        Ok(Self {
            environment: config.environment,
            api_url,
            provider,
            pipeline,
            http,
            pix: OnceCell::new(),
        })
    }

    /// Build a client from environment variables with default options.
    pub fn from_env() -> Result<Self> {
        Self::new(Config::from_env()?, ClientOptions::default())
    }

    /// PIX resources. Created on first use, then shared.
    pub fn pix(&self) -> &bbpix_pix::Client {
        self.pix
            .get_or_init(|| bbpix_pix::Client::new(self.http.clone()))
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// The underlying HTTP client, for endpoints without a typed wrapper.
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    pub fn circuit_state(&self) -> CircuitState {
        self.pipeline.circuit_state()
    }

    /// Close the circuit and forget counted failures.
    pub fn reset_circuit(&self) {
        self.pipeline.breaker().reset();
    }

    /// Drop the cached access token; the next request fetches a new one.
    pub fn invalidate_token(&self) {
        self.provider.invalidate();
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("environment", &self.environment)
            .field("api_url", &self.api_url)
            .field("circuit_state", &self.circuit_state())
            .finish_non_exhaustive()
    }
}
