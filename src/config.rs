//! Configuration types.

use secrecy::{ExposeSecret, SecretString};

use crate::error::ConfigError;

/// Environment variable holding the classification service credential.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// How inbound messages are classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClassifierStrategy {
    /// Ask the external completion service.
    #[default]
    External,
    /// Deterministic keyword heuristic, no network.
    Heuristic,
}

impl std::str::FromStr for ClassifierStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "external" | "llm" => Ok(Self::External),
            "heuristic" | "keywords" => Ok(Self::Heuristic),
            other => Err(ConfigError::InvalidValue {
                key: "SUPPORT_ROUTER_CLASSIFIER".into(),
                message: format!("expected 'external' or 'heuristic', got '{other}'"),
            }),
        }
    }
}

/// Router configuration.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Credential for the completion service. `None` when unset or blank.
    pub api_key: Option<SecretString>,
    /// Model selector sent with every classification request.
    pub model: String,
    /// Path of the ticket database file.
    pub db_path: String,
    /// Classification strategy.
    pub classifier: ClassifierStrategy,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gpt-3.5-turbo".to_string(),
            db_path: "./support.db".to_string(),
            classifier: ClassifierStrategy::External,
        }
    }
}

impl RouterConfig {
    /// Build configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup (environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_key = lookup(API_KEY_ENV)
            .filter(|k| !k.trim().is_empty())
            .map(SecretString::from);

        let classifier = match lookup("SUPPORT_ROUTER_CLASSIFIER") {
            Some(raw) => raw.parse::<ClassifierStrategy>()?,
            None => defaults.classifier,
        };

        Ok(Self {
            api_key,
            model: lookup("SUPPORT_ROUTER_MODEL").unwrap_or(defaults.model),
            db_path: lookup("SUPPORT_ROUTER_DB_PATH").unwrap_or(defaults.db_path),
            classifier,
        })
    }

    /// The credential, or `MissingCredential` when absent.
    pub fn require_api_key(&self) -> Result<&SecretString, ConfigError> {
        match self.api_key {
            Some(ref key) if !key.expose_secret().trim().is_empty() => Ok(key),
            _ => Err(ConfigError::MissingCredential {
                provider: "openai".into(),
                hint: format!("export {API_KEY_ENV}=sk-..."),
            }),
        }
    }
}
