//! System-prompt assembly and chat-context windowing.

pub mod assembler;
pub mod history;

pub use assembler::{PromptAssembler, CLEAR_TOKEN, GRAMMAR_DECK_TOKEN, WORD_DECK_TOKEN};
pub use history::ContextWindow;
