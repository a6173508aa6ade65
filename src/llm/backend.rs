//! Backend variants and engine-to-backend resolution.
//!
//! [`Backend`] has one variant per [`Engine`]; adding an engine means adding
//! a variant and a match arm here, nowhere else.  [`ProviderResolver`] is the
//! seam the chat orchestrator uses, so tests can substitute a canned
//! provider.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::ProvidersConfig;
use crate::llm::completion::{ChatMessage, CompletionParams, CompletionProvider, LlmError};
use crate::llm::ollama::OllamaChat;
use crate::llm::openai::OpenAiCompatible;
use crate::provider::Engine;

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

pub enum Backend {
    /// Hosted aggregator at `{api_url}/api/ai`.
    EnjoyAi(OpenAiCompatible),
    /// Direct provider with the user's API key.
    OpenAi(OpenAiCompatible),
    /// Self-hosted Ollama.
    Ollama(OllamaChat),
    /// The engine needs credentials that are not configured; every call
    /// fails with [`LlmError::MissingCredentials`].
    Unconfigured(Engine),
}

impl Backend {
    /// Build the backend for `engine` from the configured credentials.
    pub fn from_config(engine: Engine, config: &ProvidersConfig, client: reqwest::Client) -> Self {
        match engine {
            Engine::EnjoyAi => match config.enjoyai.access_token.as_deref() {
                Some(token) if !token.is_empty() => {
                    let base = format!("{}/api/ai", config.enjoyai.api_url.trim_end_matches('/'));
                    Backend::EnjoyAi(OpenAiCompatible::new(client, base, token))
                }
                _ => Backend::Unconfigured(engine),
            },
            Engine::OpenAi => match &config.openai {
                Some(openai) if !openai.key.is_empty() => {
                    let base = openai
                        .base_url
                        .clone()
                        .filter(|url| !url.is_empty())
                        .or_else(|| engine.info().default_base_url.map(str::to_string))
                        .unwrap_or_default();
                    Backend::OpenAi(OpenAiCompatible::new(client, base, openai.key.clone()))
                }
                _ => Backend::Unconfigured(engine),
            },
            Engine::Ollama => Backend::Ollama(OllamaChat::new(client, config.ollama.base_url.clone())),
        }
    }
}

#[async_trait]
impl CompletionProvider for Backend {
    async fn complete(
        &self,
        context: &[ChatMessage],
        params: &CompletionParams,
    ) -> Result<Vec<String>, LlmError> {
        match self {
            Backend::EnjoyAi(client) | Backend::OpenAi(client) => client.complete(context, params).await,
            Backend::Ollama(client) => client.complete(context, params).await,
            Backend::Unconfigured(engine) => Err(LlmError::MissingCredentials(*engine)),
        }
    }
}

// ---------------------------------------------------------------------------
// ProviderResolver
// ---------------------------------------------------------------------------

/// Maps a conversation's engine to the provider that serves it.
pub trait ProviderResolver: Send + Sync {
    fn resolve(&self, engine: Engine) -> Arc<dyn CompletionProvider>;
}

/// Production resolver: one shared HTTP client, backends built on demand
/// from [`ProvidersConfig`].
pub struct BackendResolver {
    config: ProvidersConfig,
    client: reqwest::Client,
}

impl BackendResolver {
    /// The HTTP client is pre-configured with the per-request timeout from
    /// `config.timeout_secs`.  A default client is used if the builder fails.
    pub fn from_config(config: &ProvidersConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            config: config.clone(),
            client,
        }
    }
}

impl ProviderResolver for BackendResolver {
    fn resolve(&self, engine: Engine) -> Arc<dyn CompletionProvider> {
        Arc::new(Backend::from_config(engine, &self.config, self.client.clone()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OpenAiConfig;

    fn params() -> CompletionParams {
        CompletionParams {
            model: "gpt-4o".into(),
            base_url: None,
            temperature: None,
            max_tokens: None,
            frequency_penalty: None,
            presence_penalty: None,
            number_of_choices: None,
        }
    }

    #[test]
    fn aggregator_without_token_is_unconfigured() {
        let backend = Backend::from_config(
            Engine::EnjoyAi,
            &ProvidersConfig::default(),
            reqwest::Client::new(),
        );
        assert!(matches!(backend, Backend::Unconfigured(Engine::EnjoyAi)));
    }

    #[test]
    fn aggregator_routes_through_api_ai() {
        let mut config = ProvidersConfig::default();
        config.enjoyai.api_url = "https://enjoy.bot/".into();
        config.enjoyai.access_token = Some("session".into());

        match Backend::from_config(Engine::EnjoyAi, &config, reqwest::Client::new()) {
            Backend::EnjoyAi(client) => assert_eq!(client.base_url(), "https://enjoy.bot/api/ai"),
            _ => panic!("expected the aggregator backend"),
        }
    }

    #[test]
    fn direct_provider_uses_default_root_without_override() {
        let mut config = ProvidersConfig::default();
        config.openai = Some(OpenAiConfig {
            key: "sk-test".into(),
            base_url: None,
        });

        match Backend::from_config(Engine::OpenAi, &config, reqwest::Client::new()) {
            Backend::OpenAi(client) => assert_eq!(client.base_url(), "https://api.openai.com/v1"),
            _ => panic!("expected the direct backend"),
        }
    }

    #[test]
    fn local_provider_needs_no_credentials() {
        let backend = Backend::from_config(
            Engine::Ollama,
            &ProvidersConfig::default(),
            reqwest::Client::new(),
        );
        assert!(matches!(backend, Backend::Ollama(_)));
    }

    #[tokio::test]
    async fn unconfigured_backend_fails_without_network() {
        let backend = Backend::Unconfigured(Engine::OpenAi);
        let result = backend.complete(&[ChatMessage::user("hi")], &params()).await;
        assert!(matches!(result, Err(LlmError::MissingCredentials(Engine::OpenAi))));
    }

    #[test]
    fn resolver_builds_backend_for_each_engine() {
        let resolver = BackendResolver::from_config(&ProvidersConfig::default());
        for engine in Engine::ALL {
            let _provider = resolver.resolve(engine);
        }
    }
}
