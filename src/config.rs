//! Credentials and target environment.

use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

pub const ENV_ENVIRONMENT: &str = "BB_ENVIRONMENT";
pub const ENV_CLIENT_ID: &str = "BB_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "BB_CLIENT_SECRET";
pub const ENV_DEV_APP_KEY: &str = "BB_DEV_APP_KEY";

/// Banco do Brasil API environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Environment {
    Sandbox,
    Homologacao,
    Producao,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sandbox => "sandbox",
            Self::Homologacao => "homologacao",
            Self::Producao => "producao",
        }
    }

    /// OAuth2 token endpoint.
    pub fn token_url(&self) -> &'static str {
        match self {
            Self::Sandbox => "https://oauth.sandbox.bb.com.br/oauth/token",
            Self::Homologacao => "https://oauth.hm.bb.com.br/oauth/token",
            Self::Producao => "https://oauth.bb.com.br/oauth/token",
        }
    }

    /// Base URL of the PIX API.
    pub fn api_url(&self) -> &'static str {
        match self {
            Self::Sandbox => "https://api.sandbox.bb.com.br/pix-bb/v1",
            Self::Homologacao => "https://api.hm.bb.com.br/pix-bb/v1",
            Self::Producao => "https://api.bb.com.br/pix-bb/v1",
        }
    }
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sandbox" => Ok(Self::Sandbox),
            "homologacao" => Ok(Self::Homologacao),
            "producao" => Ok(Self::Producao),
            _ => Err(Error::InvalidEnvironment(s.to_string())),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client credentials.
///
/// The secret is held in a [`SecretString`] and never shows up in `Debug`
/// output or logs.
#[derive(Debug)]
pub struct Config {
    pub environment: Environment,
    /// OAuth2 client ID.
    pub client_id: String,
    /// OAuth2 client secret.
    pub client_secret: SecretString,
    /// Developer application key, sent on every API call.
    pub developer_app_key: String,
}

impl Config {
    pub fn new(
        environment: Environment,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        developer_app_key: impl Into<String>,
    ) -> Self {
        Self {
            environment,
            client_id: client_id.into(),
            client_secret: SecretString::new(client_secret.into().into()),
            developer_app_key: developer_app_key.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.client_id.trim().is_empty() {
            return Err(Error::Config("client_id is required".into()));
        }
        if self.client_secret.expose_secret().trim().is_empty() {
            return Err(Error::Config("client_secret is required".into()));
        }
        if self.developer_app_key.trim().is_empty() {
            return Err(Error::Config("developer_app_key is required".into()));
        }
        Ok(())
    }

    /// Load from `BB_ENVIRONMENT`, `BB_CLIENT_ID`, `BB_CLIENT_SECRET` and
    /// `BB_DEV_APP_KEY`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`Config::from_env`], after loading a `.env` file from the
    /// current directory or its parents when there is one.
    pub fn from_dotenv() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env file"),
            Err(e) if e.not_found() => {}
            Err(e) => return Err(e.into()),
        }
        Self::from_env()
    }

    /// Load through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &'static str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or(Error::MissingEnv(key))
        };

        let environment = var(ENV_ENVIRONMENT)?.parse::<Environment>()?;
        let config = Self::new(
            environment,
            var(ENV_CLIENT_ID)?,
            var(ENV_CLIENT_SECRET)?,
            var(ENV_DEV_APP_KEY)?,
        );
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    const FULL: &[(&str, &str)] = &[
        ("BB_ENVIRONMENT", "sandbox"),
        ("BB_CLIENT_ID", "id"),
        ("BB_CLIENT_SECRET", "secret"),
        ("BB_DEV_APP_KEY", "app-key"),
    ];

    #[test]
    fn test_environment_urls() {
        assert_eq!(
            Environment::Sandbox.token_url(),
            "https://oauth.sandbox.bb.com.br/oauth/token"
        );
        assert_eq!(
            Environment::Homologacao.api_url(),
            "https://api.hm.bb.com.br/pix-bb/v1"
        );
        assert_eq!(Environment::Producao.api_url(), "https://api.bb.com.br/pix-bb/v1");
        assert_eq!(Environment::Producao.token_url(), "https://oauth.bb.com.br/oauth/token");
    }

    #[test]
    fn test_environment_parse() {
        assert_eq!("sandbox".parse::<Environment>().unwrap(), Environment::Sandbox);
        assert_eq!("HOMOLOGACAO".parse::<Environment>().unwrap(), Environment::Homologacao);
        assert_eq!("Producao".parse::<Environment>().unwrap(), Environment::Producao);
        assert!(matches!(
            "staging".parse::<Environment>(),
            Err(Error::InvalidEnvironment(name)) if name == "staging"
        ));
        assert_eq!(Environment::Homologacao.to_string(), "homologacao");
    }

    #[test]
    fn test_validate() {
        assert!(Config::new(Environment::Sandbox, "id", "secret", "key").validate().is_ok());

        let err = Config::new(Environment::Sandbox, "", "secret", "key")
            .validate()
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid configuration: client_id is required");

        assert!(Config::new(Environment::Sandbox, "id", "", "key").validate().is_err());
        assert!(Config::new(Environment::Sandbox, "id", "secret", " ").validate().is_err());
    }

    #[test]
    fn test_debug_hides_secret() {
        let config = Config::new(Environment::Sandbox, "id", "super-secret", "key");
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("id"));
    }

    #[test]
    fn test_from_lookup() {
        let config = Config::from_lookup(lookup(FULL)).unwrap();
        assert_eq!(config.environment, Environment::Sandbox);
        assert_eq!(config.client_id, "id");
        assert_eq!(config.client_secret.expose_secret(), "secret");
        assert_eq!(config.developer_app_key, "app-key");
    }

    #[test]
    fn test_from_lookup_missing_variables() {
        for missing in ["BB_ENVIRONMENT", "BB_CLIENT_ID", "BB_CLIENT_SECRET", "BB_DEV_APP_KEY"] {
            let vars: Vec<_> = FULL.iter().copied().filter(|(k, _)| *k != missing).collect();
            match Config::from_lookup(lookup(&vars)) {
                Err(Error::MissingEnv(name)) => assert_eq!(name, missing),
                other => panic!("expected missing {missing}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_from_lookup_empty_counts_as_missing() {
        let vars = [
            ("BB_ENVIRONMENT", "sandbox"),
            ("BB_CLIENT_ID", "  "),
            ("BB_CLIENT_SECRET", "secret"),
            ("BB_DEV_APP_KEY", "app-key"),
        ];
        assert!(matches!(
            Config::from_lookup(lookup(&vars)),
            Err(Error::MissingEnv("BB_CLIENT_ID"))
        ));
    }

    #[test]
    fn test_from_lookup_invalid_environment() {
        let vars = [
            ("BB_ENVIRONMENT", "qa"),
            ("BB_CLIENT_ID", "id"),
            ("BB_CLIENT_SECRET", "secret"),
            ("BB_DEV_APP_KEY", "app-key"),
        ];
        assert!(matches!(
            Config::from_lookup(lookup(&vars)),
            Err(Error::InvalidEnvironment(_))
        ));
    }
}
