//! Bounded chat context for a single turn.
//!
//! [`ContextWindow`] keeps at most `limit` prior messages.  The store hands
//! messages back newest first; the window reverses them so the backend sees
//! the conversation in chronological order:
//!
//! ```text
//! system      ← only when the assembled prompt is non-empty
//! history[0]  ← oldest kept message
//! ...
//! history[n]  ← most recent message
//! user        ← the new turn
//! ```

use std::collections::VecDeque;

use crate::chat::Message;
use crate::llm::ChatMessage;

pub struct ContextWindow {
    history: VecDeque<ChatMessage>,
    limit: usize,
}

impl ContextWindow {
    /// An empty window keeping at most `limit` prior messages.
    ///
    /// Nothing is allocated up front; `limit` may be arbitrarily large.
    pub fn new(limit: usize) -> Self {
        Self {
            history: VecDeque::new(),
            limit,
        }
    }

    /// Load messages as returned by the store (newest first).
    ///
    /// Anything beyond `limit` is dropped, oldest first.
    pub fn with_recent(mut self, newest_first: &[Message]) -> Self {
        self.history.reserve(newest_first.len().min(self.limit));
        for message in newest_first.iter().take(self.limit) {
            self.history.push_front(ChatMessage::from(message));
        }
        self
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Full context for the backend: optional system prompt, history, then
    /// the new user message.
    pub fn build(&self, system_prompt: &str, user_text: &str) -> Vec<ChatMessage> {
        let mut context = Vec::with_capacity(self.history.len() + 2);
        if !system_prompt.is_empty() {
            context.push(ChatMessage::system(system_prompt));
        }
        context.extend(self.history.iter().cloned());
        context.push(ChatMessage::user(user_text));
        context
    }
}
