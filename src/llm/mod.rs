//! LLM integration for the support router.
//!
//! Uses the rig-core crate for HTTP transport and the `RigAdapter` to bridge
//! rig's `CompletionModel` trait to our `LlmProvider` trait.

pub mod provider;
mod rig_adapter;

pub use provider::*;
pub use rig_adapter::RigAdapter;

use std::sync::Arc;

use rig::client::CompletionClient;
use secrecy::ExposeSecret;

use crate::config::RouterConfig;
use crate::error::{ConfigError, LlmError, PipelineError};

/// Supported LLM backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmBackend {
    OpenAi,
}

/// Configuration for creating an LLM provider.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub backend: LlmBackend,
    pub api_key: secrecy::SecretString,
    pub model: String,
}

impl LlmConfig {
    /// Derive provider settings from router configuration.
    ///
    /// Fails with `MissingCredential` when no API key is configured.
    pub fn from_router_config(config: &RouterConfig) -> Result<Self, ConfigError> {
        let api_key = config.require_api_key()?.clone();
        Ok(Self {
            backend: LlmBackend::OpenAi,
            api_key,
            model: config.model.clone(),
        })
    }
}

/// Create an LLM provider from configuration.
pub fn create_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    match config.backend {
        LlmBackend::OpenAi => create_openai_provider(config),
    }
}

/// Resolve credentials and build a provider in one step.
pub fn provider_from_router_config(
    config: &RouterConfig,
) -> Result<Arc<dyn LlmProvider>, PipelineError> {
    let llm_config = LlmConfig::from_router_config(config)?;
    Ok(create_provider(&llm_config)?)
}

fn create_openai_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    use rig::providers::openai;

    let client: rig::client::Client<openai::client::OpenAIResponsesExt> =
        openai::Client::new(config.api_key.expose_secret()).map_err(|e| {
            LlmError::RequestFailed {
                provider: "openai".to_string(),
                reason: format!("Failed to create OpenAI client: {}", e),
            }
        })?;

    let model = client.completion_model(&config.model);
    tracing::info!("Using OpenAI (model: {})", config.model);
    Ok(Arc::new(RigAdapter::new(model, &config.model)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_openai_provider() {
        // rig clients accept any key at construction; auth fails on first request.
        let config = LlmConfig {
            backend: LlmBackend::OpenAi,
            api_key: secrecy::SecretString::from("sk-test"),
            model: "gpt-3.5-turbo".to_string(),
        };
        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.model_name(), "gpt-3.5-turbo");
    }

    #[test]
    fn test_missing_key_fails_at_assembly() {
        let config = RouterConfig::default();
        let result = provider_from_router_config(&config);
        assert!(matches!(
            result,
            Err(PipelineError::Config(ConfigError::MissingCredential { .. }))
        ));
    }

    #[test]
    fn test_present_key_builds_provider() {
        let config = RouterConfig {
            api_key: Some(secrecy::SecretString::from("sk-live")),
            model: "gpt-4o-mini".to_string(),
            ..RouterConfig::default()
        };
        let provider = provider_from_router_config(&config).unwrap();
        assert_eq!(provider.model_name(), "gpt-4o-mini");
    }
}
