//! Conversation and message records.
//!
//! Field names serialise in camelCase so snapshots stay compatible with the
//! records the desktop front-end reads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::provider::Engine;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// How a conversation answers a user turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationType {
    /// Chat completion against the selected backend.
    Gpt,
    /// Echo the user's text and synthesise it as speech.
    Tts,
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Speech settings attached to a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TtsConfig {
    pub engine: Engine,
    pub model: String,
    pub voice: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            engine: Engine::EnjoyAi,
            model: "tts-1".into(),
            voice: "alloy".into(),
            base_url: None,
        }
    }
}

/// Per-conversation backend configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConversationConfig {
    pub model: String,
    /// Overrides the engine's default endpoint when the engine accepts it.
    pub base_url: Option<String>,
    /// System prompt template; may contain the deck tokens.
    pub role_definition: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
    pub number_of_choices: u32,
    /// How many of the most recent messages are sent as context.
    pub history_buffer_size: usize,
    pub tts: TtsConfig,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".into(),
            base_url: None,
            role_definition: String::new(),
            temperature: 0.2,
            max_tokens: Some(2048),
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
            number_of_choices: 1,
            history_buffer_size: 0,
            tts: TtsConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Conversation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub name: String,
    pub engine: Engine,
    #[serde(rename = "type")]
    pub conversation_type: ConversationType,
    pub configuration: ConversationConfig,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    /// Create a conversation with a fresh id.
    pub fn new(
        name: impl Into<String>,
        engine: Engine,
        conversation_type: ConversationType,
        configuration: ConversationConfig,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            engine,
            conversation_type,
            configuration,
            created_at: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Message {
    pub fn new(conversation_id: impl Into<String>, role: Role, content: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            conversation_id: conversation_id.into(),
            role,
            content: content.into(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn user(conversation_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(conversation_id, Role::User, content)
    }

    pub fn assistant(conversation_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(conversation_id, Role::Assistant, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversation_serialises_type_and_engine_as_wire_names() {
        let conversation = Conversation::new(
            "coach",
            Engine::OpenAi,
            ConversationType::Tts,
            ConversationConfig::default(),
        );
        let json = serde_json::to_value(&conversation).unwrap();
        assert_eq!(json["type"], "tts");
        assert_eq!(json["engine"], "openai");
        assert_eq!(json["configuration"]["historyBufferSize"], 0);
        assert_eq!(json["configuration"]["tts"]["model"], "tts-1");
    }

    #[test]
    fn partial_configuration_uses_defaults() {
        let config: ConversationConfig =
            serde_json::from_str(r#"{"model":"gpt-4o-mini","historyBufferSize":4}"#).unwrap();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.history_buffer_size, 4);
        assert_eq!(config.number_of_choices, 1);
    }

    #[test]
    fn message_constructors_set_role_and_fresh_ids() {
        let a = Message::user("c1", "bonjour");
        let b = Message::assistant("c1", "salut");
        assert_eq!(a.role, Role::User);
        assert_eq!(b.role, Role::Assistant);
        assert_ne!(a.id, b.id);
        assert_eq!(a.created_at, a.updated_at);
    }
}
