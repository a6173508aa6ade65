//! Chat-completion backends.
//!
//! This module provides:
//! * [`CompletionProvider`]: async trait implemented by every backend.
//! * [`Backend`]: one variant per [`Engine`](crate::provider::Engine).
//! * [`OpenAiCompatible`] / [`OllamaChat`]: the two wire formats in use.
//! * [`ProviderResolver`] / [`BackendResolver`]: engine → provider lookup.
//! * [`complete_or_degrade`] / [`Completion`]: never-failing completion
//!   used by the chat orchestrator.
//! * [`LlmError`]: error variants for completion calls.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use lingo_engine::config::AppConfig;
//! use lingo_engine::llm::{BackendResolver, ChatMessage, CompletionParams, ProviderResolver};
//! use lingo_engine::chat::ConversationConfig;
//! use lingo_engine::provider::Engine;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let resolver = BackendResolver::from_config(&config.providers);
//!     let provider = resolver.resolve(Engine::Ollama);
//!
//!     let params = CompletionParams::for_conversation(Engine::Ollama, &ConversationConfig::default());
//!     let replies = provider
//!         .complete(&[ChatMessage::user("Bonjour !")], &params)
//!         .await
//!         .unwrap();
//!     println!("{}", replies[0]);
//! }
//! ```

pub mod backend;
pub mod completion;
pub mod fallback;
pub mod ollama;
pub mod openai;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use backend::{Backend, BackendResolver, ProviderResolver};
pub use completion::{ChatMessage, ChatRole, CompletionParams, CompletionProvider, LlmError};
pub use fallback::{complete_or_degrade, Completion};
pub use ollama::OllamaChat;
pub use openai::OpenAiCompatible;
