//! Static registry of the supported completion backends.
//!
//! Each [`ProviderInfo`] lists the models offered in the picker and the set of
//! conversation fields the backend honours.  Fields outside that set are
//! dropped before a request is built (see
//! [`CompletionParams::for_conversation`](crate::llm::CompletionParams::for_conversation)).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// ProviderError
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    /// The identifier does not name a registered backend.
    #[error("unsupported engine: {0}")]
    UnsupportedEngine(String),
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Closed set of backend profiles a conversation can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Engine {
    /// Hosted aggregator; authenticated with the user's session token.
    #[serde(rename = "enjoyai")]
    EnjoyAi,
    /// Direct API-key provider.
    #[serde(rename = "openai")]
    OpenAi,
    /// Self-hosted provider on the local machine.
    #[serde(rename = "ollama")]
    Ollama,
}

impl Engine {
    pub const ALL: [Engine; 3] = [Engine::EnjoyAi, Engine::OpenAi, Engine::Ollama];

    /// Wire identifier, as stored on conversations.
    pub fn id(&self) -> &'static str {
        match self {
            Engine::EnjoyAi => "enjoyai",
            Engine::OpenAi => "openai",
            Engine::Ollama => "ollama",
        }
    }

    /// Registry entry for this engine.
    pub fn info(&self) -> &'static ProviderInfo {
        // PROVIDERS holds exactly one entry per variant, in `ALL` order.
        &PROVIDERS[*self as usize]
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Engine {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Engine::ALL
            .into_iter()
            .find(|engine| engine.id() == s)
            .ok_or_else(|| ProviderError::UnsupportedEngine(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// ConfigField
// ---------------------------------------------------------------------------

/// Conversation configuration fields a backend may accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigField {
    Model,
    BaseUrl,
    RoleDefinition,
    Temperature,
    NumberOfChoices,
    MaxTokens,
    FrequencyPenalty,
    PresencePenalty,
    HistoryBufferSize,
    Tts,
}

impl ConfigField {
    /// Field name as used in persisted conversation configuration.
    pub fn name(&self) -> &'static str {
        match self {
            ConfigField::Model => "model",
            ConfigField::BaseUrl => "baseUrl",
            ConfigField::RoleDefinition => "roleDefinition",
            ConfigField::Temperature => "temperature",
            ConfigField::NumberOfChoices => "numberOfChoices",
            ConfigField::MaxTokens => "maxTokens",
            ConfigField::FrequencyPenalty => "frequencyPenalty",
            ConfigField::PresencePenalty => "presencePenalty",
            ConfigField::HistoryBufferSize => "historyBufferSize",
            ConfigField::Tts => "tts",
        }
    }
}

// ---------------------------------------------------------------------------
// ProviderInfo
// ---------------------------------------------------------------------------

/// Static description of one backend.
#[derive(Debug)]
pub struct ProviderInfo {
    pub engine: Engine,
    pub display_name: &'static str,
    /// Endpoint used when the conversation does not override it.
    pub default_base_url: Option<&'static str>,
    /// Models offered in the picker; empty means "whatever the host serves".
    pub available_models: &'static [&'static str],
    pub configurable_fields: &'static [ConfigField],
}

impl ProviderInfo {
    /// Whether `field` may be forwarded to this backend.
    pub fn accepts(&self, field: ConfigField) -> bool {
        self.configurable_fields.contains(&field)
    }
}

use ConfigField::*;

static PROVIDERS: [ProviderInfo; 3] = [
    ProviderInfo {
        engine: Engine::EnjoyAi,
        display_name: "EnjoyAI",
        default_base_url: None,
        available_models: &[
            "gpt-4o-mini",
            "gpt-4o",
            "chatgpt-4o-latest",
            "gpt-4-turbo",
            "gpt-4",
            "anthropic/claude-3.5-sonnet",
            "meta-llama/llama-3.1-8b-instruct",
            "meta-llama/llama-3.1-70b-instruct",
            "meta-llama/llama-3.1-405b-instruct",
            "google/gemma-2-27b-it",
            "google/gemma-2-9b-it:free",
            "google/gemini-pro-1.5",
            "google/gemini-flash-1.5",
            "perplexity/llama-3-sonar-large-32k-online",
            "deepseek/deepseek-chat",
            "deepseek/deepseek-coder",
        ],
        configurable_fields: &[
            Model,
            RoleDefinition,
            Temperature,
            NumberOfChoices,
            MaxTokens,
            FrequencyPenalty,
            PresencePenalty,
            HistoryBufferSize,
            Tts,
        ],
    },
    ProviderInfo {
        engine: Engine::OpenAi,
        display_name: "OpenAI",
        default_base_url: Some("https://api.openai.com/v1"),
        available_models: &["gpt-4o-mini", "gpt-4o", "chatgpt-4o-latest", "gpt-4-turbo", "gpt-4"],
        configurable_fields: &[
            Model,
            BaseUrl,
            RoleDefinition,
            Temperature,
            NumberOfChoices,
            MaxTokens,
            FrequencyPenalty,
            PresencePenalty,
            HistoryBufferSize,
            Tts,
        ],
    },
    ProviderInfo {
        engine: Engine::Ollama,
        display_name: "Ollama",
        default_base_url: Some("http://localhost:11434"),
        available_models: &[],
        configurable_fields: &[
            Model,
            BaseUrl,
            RoleDefinition,
            Temperature,
            MaxTokens,
            HistoryBufferSize,
            FrequencyPenalty,
            PresencePenalty,
            Tts,
        ],
    },
];

/// All registered backends, in picker order.
pub fn providers() -> &'static [ProviderInfo] {
    &PROVIDERS
}

/// Look up a backend by its wire identifier.
///
/// ```
/// use lingo_engine::provider::{lookup, ProviderError};
///
/// assert_eq!(lookup("ollama").unwrap().display_name, "Ollama");
/// assert!(matches!(lookup("gemini"), Err(ProviderError::UnsupportedEngine(_))));
/// ```
pub fn lookup(id: &str) -> Result<&'static ProviderInfo, ProviderError> {
    id.parse::<Engine>().map(|engine| engine.info())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
