//! Conversation and speech engine for a language-learning desktop app.
//!
//! A user turn flows through the crate like this:
//!
//! ```text
//! chat::ChatOrchestrator
//!   ├─ store::MessageStore        recent history
//!   ├─ prompt::PromptAssembler    system prompt ◀── anki::DeckCache
//!   ├─ llm::ProviderResolver      completion backend (provider::Engine)
//!   └─ speech::SpeechService      SSML + synthesis for `tts` conversations
//! ```
//!
//! Independently, [`export::RecordingExporter`] picks the best recorded
//! attempt of every sentence of a practice target and concatenates them.

pub mod anki;
pub mod chat;
pub mod config;
pub mod export;
pub mod llm;
pub mod prompt;
pub mod provider;
pub mod speech;
pub mod store;
