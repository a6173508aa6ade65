//! Persistence boundary.
//!
//! The engine never defines a schema; it reads and writes records through
//! these traits.  [`MemoryStore`] implements all of them in-process with an
//! optional JSON snapshot on disk.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::chat::{Conversation, Message};
use crate::export::{Recording, ScoredRecording, Target, TargetType};
use crate::speech::Speech;

pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("invalid record: {0}")]
    Invalid(String),

    #[error("snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn conversation(&self, id: &str) -> Result<Option<Conversation>, StoreError>;
    async fn save_conversation(&self, conversation: Conversation) -> Result<(), StoreError>;
}

#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Up to `limit` messages of a conversation, newest first.
    async fn recent_messages(
        &self,
        conversation_id: &str,
        limit: usize,
    ) -> Result<Vec<Message>, StoreError>;

    /// Persist every message or none of them.
    async fn create_messages(&self, batch: Vec<Message>) -> Result<Vec<Message>, StoreError>;
}

#[async_trait]
pub trait SpeechStore: Send + Sync {
    async fn create_speech(&self, speech: Speech) -> Result<Speech, StoreError>;
}

#[async_trait]
pub trait RecordingStore: Send + Sync {
    async fn find_target(
        &self,
        target_id: &str,
        target_type: TargetType,
    ) -> Result<Option<Target>, StoreError>;

    /// Every recording of a target, each joined to its highest
    /// pronunciation score.
    async fn scored_recordings(
        &self,
        target_id: &str,
        target_type: TargetType,
    ) -> Result<Vec<ScoredRecording>, StoreError>;

    /// Recordings of any target created within `from..=to`.
    async fn recordings_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Recording>, StoreError>;
}
