//! Core `CompletionProvider` trait, request parameters and `LlmError`.
//!
//! Every backend receives the same inputs: the ordered chat context (system
//! instruction, history, current user turn) and a [`CompletionParams`] that
//! has already been filtered through the engine's configurable-field set.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chat::{ConversationConfig, Message, Role};
use crate::provider::{ConfigField, Engine};

// ---------------------------------------------------------------------------
// LlmError
// ---------------------------------------------------------------------------

/// Errors that can occur during a completion call.
#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("completion request timed out")]
    Timeout,

    /// The backend answered with a non-success status.
    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The HTTP response could not be parsed as expected JSON.
    #[error("failed to parse completion response: {0}")]
    Parse(String),

    /// The backend returned no usable text.
    #[error("backend returned an empty response")]
    EmptyResponse,

    /// The engine needs a key or token that has not been configured.
    #[error("no credentials configured for {0}")]
    MissingCredentials(Engine),
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// ChatMessage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One entry of the context sent to a backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

impl From<&Message> for ChatMessage {
    fn from(message: &Message) -> Self {
        match message.role {
            Role::User => ChatMessage::user(message.content.clone()),
            Role::Assistant => ChatMessage::assistant(message.content.clone()),
        }
    }
}

// ---------------------------------------------------------------------------
// CompletionParams
// ---------------------------------------------------------------------------

/// Sampling and routing parameters for one completion call.
///
/// `None` means "not sent"; the backend's own default applies.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionParams {
    pub model: String,
    pub base_url: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub frequency_penalty: Option<f32>,
    pub presence_penalty: Option<f32>,
    pub number_of_choices: Option<u32>,
}

impl CompletionParams {
    /// Build the parameters for `engine`, dropping every field the engine
    /// does not list as configurable.
    pub fn for_conversation(engine: Engine, config: &ConversationConfig) -> Self {
        let info = engine.info();
        let accepted = |field: ConfigField| info.accepts(field);

        Self {
            model: config.model.clone(),
            base_url: config
                .base_url
                .clone()
                .filter(|url| accepted(ConfigField::BaseUrl) && !url.trim().is_empty()),
            temperature: Some(config.temperature).filter(|_| accepted(ConfigField::Temperature)),
            max_tokens: config.max_tokens.filter(|_| accepted(ConfigField::MaxTokens)),
            frequency_penalty: Some(config.frequency_penalty)
                .filter(|_| accepted(ConfigField::FrequencyPenalty)),
            presence_penalty: Some(config.presence_penalty)
                .filter(|_| accepted(ConfigField::PresencePenalty)),
            number_of_choices: Some(config.number_of_choices.max(1))
                .filter(|_| accepted(ConfigField::NumberOfChoices)),
        }
    }
}

// ---------------------------------------------------------------------------
// CompletionProvider trait
// ---------------------------------------------------------------------------

/// Async chat-completion capability shared by every backend.
///
/// Implementors must be `Send + Sync` so they can be held behind
/// `Arc<dyn CompletionProvider>`.  One call is one HTTP request: there is no
/// retry, a failure surfaces to the caller immediately.
///
/// Returns one string per generated choice, in the backend's order.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(
        &self,
        context: &[ChatMessage],
        params: &CompletionParams,
    ) -> Result<Vec<String>, LlmError>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ConversationConfig {
        ConversationConfig {
            model: "llama3".into(),
            base_url: Some("http://gpu-box:11434".into()),
            temperature: 0.7,
            max_tokens: Some(512),
            frequency_penalty: 0.1,
            presence_penalty: 0.2,
            number_of_choices: 3,
            ..ConversationConfig::default()
        }
    }

    #[test]
    fn ollama_drops_choice_count() {
        let params = CompletionParams::for_conversation(Engine::Ollama, &config());
        assert_eq!(params.number_of_choices, None);
        assert_eq!(params.base_url.as_deref(), Some("http://gpu-box:11434"));
        assert_eq!(params.temperature, Some(0.7));
        assert_eq!(params.max_tokens, Some(512));
    }

    #[test]
    fn hosted_aggregator_drops_base_url() {
        let params = CompletionParams::for_conversation(Engine::EnjoyAi, &config());
        assert_eq!(params.base_url, None);
        assert_eq!(params.number_of_choices, Some(3));
        assert_eq!(params.frequency_penalty, Some(0.1));
        assert_eq!(params.presence_penalty, Some(0.2));
    }

    #[test]
    fn blank_base_url_is_not_forwarded() {
        let mut cfg = config();
        cfg.base_url = Some("  ".into());
        let params = CompletionParams::for_conversation(Engine::OpenAi, &cfg);
        assert_eq!(params.base_url, None);
    }

    #[test]
    fn zero_choices_is_raised_to_one() {
        let mut cfg = config();
        cfg.number_of_choices = 0;
        let params = CompletionParams::for_conversation(Engine::OpenAi, &cfg);
        assert_eq!(params.number_of_choices, Some(1));
    }

    #[test]
    fn message_roles_map_to_chat_roles() {
        let user = Message::user("c", "hi");
        let assistant = Message::assistant("c", "hello");
        assert_eq!(ChatMessage::from(&user).role, ChatRole::User);
        assert_eq!(ChatMessage::from(&assistant).role, ChatRole::Assistant);
    }

    /// `CompletionProvider` must be usable as a trait object.
    #[test]
    fn provider_is_object_safe() {
        struct Nothing;

        #[async_trait]
        impl CompletionProvider for Nothing {
            async fn complete(
                &self,
                _context: &[ChatMessage],
                _params: &CompletionParams,
            ) -> Result<Vec<String>, LlmError> {
                Err(LlmError::EmptyResponse)
            }
        }

        let provider: Box<dyn CompletionProvider> = Box::new(Nothing);
        drop(provider);
    }
}
