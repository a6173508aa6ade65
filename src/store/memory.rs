//! In-process store with JSON snapshot persistence.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chat::{Conversation, Message};
use crate::export::{PronunciationAssessment, Recording, ScoredRecording, Target, TargetType};
use crate::speech::Speech;
use crate::store::{ConversationStore, MessageStore, RecordingStore, SpeechStore, StoreError};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Snapshot {
    conversations: Vec<Conversation>,
    messages: Vec<Message>,
    speeches: Vec<Speech>,
    targets: Vec<Target>,
    recordings: Vec<Recording>,
    assessments: Vec<PronunciationAssessment>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<Snapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a snapshot written by [`save_to`](Self::save_to).
    ///
    /// A missing file yields an empty store.
    pub fn load_from(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            log::info!("store: {} not found, starting empty", path.display());
            return Ok(Self::new());
        }
        let content = std::fs::read_to_string(path)?;
        let snapshot: Snapshot = serde_json::from_str(&content)?;
        log::debug!(
            "store: loaded {} conversations, {} messages, {} recordings from {}",
            snapshot.conversations.len(),
            snapshot.messages.len(),
            snapshot.recordings.len(),
            path.display()
        );
        Ok(Self {
            data: Mutex::new(snapshot),
        })
    }

    /// Write the whole store as pretty-printed JSON, creating parent
    /// directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&*self.lock())?;
        std::fs::write(path, content)?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Direct access
    // -----------------------------------------------------------------------

    pub fn insert_target(&self, target: Target) {
        self.lock().targets.push(target);
    }

    pub fn insert_recording(&self, recording: Recording) {
        self.lock().recordings.push(recording);
    }

    pub fn insert_assessment(&self, assessment: PronunciationAssessment) {
        self.lock().assessments.push(assessment);
    }

    pub fn conversations(&self) -> Vec<Conversation> {
        self.lock().conversations.clone()
    }

    /// All messages of a conversation in insertion order.
    pub fn messages(&self, conversation_id: &str) -> Vec<Message> {
        self.lock()
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect()
    }

    pub fn speeches(&self) -> Vec<Speech> {
        self.lock().speeches.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Snapshot> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn conversation(&self, id: &str) -> Result<Option<Conversation>, StoreError> {
        Ok(self.lock().conversations.iter().find(|c| c.id == id).cloned())
    }

    async fn save_conversation(&self, conversation: Conversation) -> Result<(), StoreError> {
        let mut data = self.lock();
        match data.conversations.iter_mut().find(|c| c.id == conversation.id) {
            Some(existing) => *existing = conversation,
            None => data.conversations.push(conversation),
        }
        Ok(())
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn recent_messages(
        &self,
        conversation_id: &str,
        limit: usize,
    ) -> Result<Vec<Message>, StoreError> {
        let data = self.lock();
        let mut messages: Vec<&Message> = data
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .collect();
        // Stable sort: equal timestamps keep insertion order.
        messages.sort_by_key(|m| m.created_at);
        Ok(messages.into_iter().rev().take(limit).cloned().collect())
    }

    async fn create_messages(&self, batch: Vec<Message>) -> Result<Vec<Message>, StoreError> {
        let mut data = self.lock();
        if let Some(duplicate) = batch
            .iter()
            .find(|m| data.messages.iter().any(|existing| existing.id == m.id))
        {
            return Err(StoreError::Invalid(format!("duplicate message id {}", duplicate.id)));
        }
        data.messages.extend(batch.iter().cloned());
        Ok(batch)
    }
}

#[async_trait]
impl SpeechStore for MemoryStore {
    async fn create_speech(&self, speech: Speech) -> Result<Speech, StoreError> {
        self.lock().speeches.push(speech.clone());
        Ok(speech)
    }
}

#[async_trait]
impl RecordingStore for MemoryStore {
    async fn find_target(
        &self,
        target_id: &str,
        target_type: TargetType,
    ) -> Result<Option<Target>, StoreError> {
        Ok(self
            .lock()
            .targets
            .iter()
            .find(|t| t.id == target_id && t.target_type == target_type)
            .cloned())
    }

    async fn scored_recordings(
        &self,
        target_id: &str,
        target_type: TargetType,
    ) -> Result<Vec<ScoredRecording>, StoreError> {
        let data = self.lock();
        Ok(data
            .recordings
            .iter()
            .filter(|r| r.target_id == target_id && r.target_type == target_type)
            .map(|recording| ScoredRecording {
                best_score: data
                    .assessments
                    .iter()
                    .filter(|a| a.recording_id == recording.id)
                    .map(|a| a.pronunciation_score)
                    .fold(None, |best: Option<f64>, score| {
                        Some(best.map_or(score, |b| b.max(score)))
                    }),
                recording: recording.clone(),
            })
            .collect())
    }

    async fn recordings_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Recording>, StoreError> {
        Ok(self
            .lock()
            .recordings
            .iter()
            .filter(|r| r.created_at >= from && r.created_at <= to)
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{ConversationConfig, ConversationType};
    use crate::provider::Engine;
    use chrono::{Duration, Utc};
    use tempfile::TempDir;

    fn target() -> Target {
        Target {
            id: "t1".into(),
            target_type: TargetType::Audio,
            name: "Le Petit Prince, ch. 1".into(),
            src: "enjoy://library/audios/petit-prince.mp3".into(),
        }
    }

    #[tokio::test]
    async fn recent_messages_are_newest_first_and_limited() {
        let store = MemoryStore::new();
        let base = Utc::now();
        let batch: Vec<Message> = (0..5)
            .map(|i| {
                let mut m = Message::user("c1", format!("m{i}"));
                m.created_at = base + Duration::seconds(i);
                m
            })
            .collect();
        store.create_messages(batch).await.unwrap();
        store.create_messages(vec![Message::user("other", "x")]).await.unwrap();

        let recent = store.recent_messages("c1", 3).await.unwrap();
        let contents: Vec<&str> = recent.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["m4", "m3", "m2"]);
        assert!(store.recent_messages("c1", 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn equal_timestamps_keep_insertion_order() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let mut user = Message::user("c1", "question");
        let mut reply = Message::assistant("c1", "answer");
        user.created_at = now;
        reply.created_at = now;
        store.create_messages(vec![user, reply]).await.unwrap();

        let recent = store.recent_messages("c1", 1).await.unwrap();
        assert_eq!(recent[0].content, "answer");
    }

    #[tokio::test]
    async fn batch_with_duplicate_id_writes_nothing() {
        let store = MemoryStore::new();
        let first = Message::user("c1", "a");
        store.create_messages(vec![first.clone()]).await.unwrap();

        let result = store
            .create_messages(vec![Message::assistant("c1", "b"), first])
            .await;
        assert!(matches!(result, Err(StoreError::Invalid(_))));
        assert_eq!(store.messages("c1").len(), 1);
    }

    #[tokio::test]
    async fn recordings_join_their_best_score() {
        let store = MemoryStore::new();
        let target = target();
        store.insert_target(target.clone());

        let scored = Recording::new(&target, 1, "Bonjour", 1200, "a.mp3");
        let unscored = Recording::new(&target, 2, "Salut", 800, "b.mp3");
        store.insert_assessment(PronunciationAssessment::new(&scored.id, 62.0));
        store.insert_assessment(PronunciationAssessment::new(&scored.id, 88.5));
        store.insert_recording(scored.clone());
        store.insert_recording(unscored.clone());

        let rows = store.scored_recordings("t1", TargetType::Audio).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].best_score, Some(88.5));
        assert_eq!(rows[1].best_score, None);
        assert!(store
            .scored_recordings("t1", TargetType::Video)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn recordings_between_is_inclusive() {
        let store = MemoryStore::new();
        let target = target();
        let now = Utc::now();
        for (name, age_days) in [("old", 10), ("edge", 7), ("new", 1)] {
            let mut recording = Recording::new(&target, 1, "", 100, format!("{name}.mp3"));
            recording.created_at = now - Duration::days(age_days);
            store.insert_recording(recording);
        }

        let rows = store
            .recordings_between(now - Duration::days(7), now)
            .await
            .unwrap();
        let srcs: Vec<&str> = rows.iter().map(|r| r.src.as_str()).collect();
        assert_eq!(srcs, vec!["edge.mp3", "new.mp3"]);
    }

    #[tokio::test]
    async fn snapshot_round_trips_through_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let store = MemoryStore::new();
        let conversation = Conversation::new(
            "coach",
            Engine::Ollama,
            ConversationType::Gpt,
            ConversationConfig::default(),
        );
        store.save_conversation(conversation.clone()).await.unwrap();
        store
            .create_messages(vec![Message::user(&conversation.id, "hello")])
            .await
            .unwrap();
        store.insert_target(target());
        store.save_to(&path).unwrap();

        let loaded = MemoryStore::load_from(&path).unwrap();
        assert_eq!(
            loaded.conversation(&conversation.id).await.unwrap(),
            Some(conversation.clone())
        );
        assert_eq!(loaded.messages(&conversation.id).len(), 1);
        assert!(loaded
            .find_target("t1", TargetType::Audio)
            .await
            .unwrap()
            .is_some());
    }

    #[test]
    fn missing_snapshot_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::load_from(&dir.path().join("absent.json")).unwrap();
        assert!(store.conversations().is_empty());
    }
}
