//! Conversations, messages and the per-turn chat orchestrator.

pub mod model;
pub mod orchestrator;
pub mod presets;
pub mod state;

pub use model::{Conversation, ConversationConfig, ConversationType, Message, Role, TtsConfig};
pub use orchestrator::{ChatError, ChatOrchestrator, Reply, ReplyKind};
pub use presets::Preset;
pub use state::TurnState;
