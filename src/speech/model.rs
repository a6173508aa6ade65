//! Synthesised speech records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chat::TtsConfig;

pub const AUDIO_MP3: &str = "audio/mp3";

/// What a speech was generated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeechSourceType {
    Message,
    Recording,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Speech {
    pub id: String,
    pub text: String,
    pub source_type: SpeechSourceType,
    pub source_id: String,
    pub configuration: TtsConfig,
    pub content_type: String,
    #[serde(with = "audio_base64")]
    pub audio: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

impl Speech {
    /// A speech for a chat message, stored as MP3.
    pub fn for_message(
        message_id: impl Into<String>,
        text: impl Into<String>,
        configuration: TtsConfig,
        audio: Vec<u8>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            source_type: SpeechSourceType::Message,
            source_id: message_id.into(),
            configuration,
            content_type: AUDIO_MP3.into(),
            audio,
            created_at: Utc::now(),
        }
    }
}

/// Audio bytes as a base64 string in JSON snapshots.
mod audio_base64 {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}
