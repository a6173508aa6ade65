//! Chat orchestrator: one user turn in, persisted replies out.
//!
//! [`ChatOrchestrator::chat`] drives a turn through [`TurnState`]:
//!
//! ```text
//! load history (skipped when historyBufferSize = 0)
//!   └─▶ gpt: assemble system prompt (deck cache)
//!         └─▶ gpt: complete_or_degrade(backend)   ─┐
//!             tts: echo the user text             ─┤
//!                                                  └─▶ persist [user, replies...] as one batch
//!                                                        └─▶ tts: synthesise each reply (best effort)
//! ```
//!
//! A backend failure never fails a `gpt` turn; the turn returns a single
//! [`ReplyKind::Degraded`] reply instead.  Persistence failures always fail
//! the turn.

use std::sync::Arc;

use thiserror::Error;

use crate::anki::DeckError;
use crate::chat::model::{Conversation, ConversationType, Message};
use crate::chat::state::TurnState;
use crate::llm::{complete_or_degrade, Completion, CompletionParams, ProviderResolver};
use crate::prompt::{ContextWindow, PromptAssembler};
use crate::speech::{Speech, SpeechService};
use crate::store::{MessageStore, StoreError};

// ---------------------------------------------------------------------------
// Errors and results
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("could not build the system prompt: {0}")]
    Deck(#[from] DeckError),

    #[error("could not load conversation history: {0}")]
    HistoryUnavailable(#[source] StoreError),

    #[error("could not save the exchange: {0}")]
    PersistenceFailed(#[source] StoreError),
}

/// How a reply was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    /// Returned by the backend.
    Generated,
    /// Stand-in after a failed backend call: system prompt followed by the
    /// user's text.
    Degraded,
    /// `tts` conversations repeat the user's text.
    Echo,
}

#[derive(Debug, Clone)]
pub struct Reply {
    pub message: Message,
    pub kind: ReplyKind,
    /// Synthesised audio, for `tts` conversations when synthesis succeeded.
    pub speech: Option<Speech>,
}

// ---------------------------------------------------------------------------
// Turn bookkeeping
// ---------------------------------------------------------------------------

struct Turn<'a> {
    conversation_id: &'a str,
    state: TurnState,
}

impl<'a> Turn<'a> {
    fn new(conversation_id: &'a str) -> Self {
        Self {
            conversation_id,
            state: TurnState::Received,
        }
    }

    fn advance(&mut self) {
        if let Some(next) = self.state.next() {
            log::debug!(
                "chat: [{}] {} -> {}",
                self.conversation_id,
                self.state.label(),
                next.label()
            );
            self.state = next;
        }
    }

    fn fail(&mut self, error: ChatError) -> ChatError {
        log::error!(
            "chat: [{}] turn failed after {}: {error}",
            self.conversation_id,
            self.state.label()
        );
        self.state = TurnState::Failed;
        error
    }
}

// ---------------------------------------------------------------------------
// ChatOrchestrator
// ---------------------------------------------------------------------------

pub struct ChatOrchestrator {
    messages: Arc<dyn MessageStore>,
    providers: Arc<dyn ProviderResolver>,
    prompts: PromptAssembler,
    speech: Option<SpeechService>,
}

impl ChatOrchestrator {
    pub fn new(
        messages: Arc<dyn MessageStore>,
        providers: Arc<dyn ProviderResolver>,
        prompts: PromptAssembler,
    ) -> Self {
        Self {
            messages,
            providers,
            prompts,
            speech: None,
        }
    }

    /// Enable speech output for `tts` conversations.
    pub fn with_speech(mut self, speech: SpeechService) -> Self {
        self.speech = Some(speech);
        self
    }

    /// Run one user turn and return the newly created replies.
    pub async fn chat(
        &self,
        conversation: &Conversation,
        content: &str,
    ) -> Result<Vec<Reply>, ChatError> {
        let config = &conversation.configuration;
        let mut turn = Turn::new(&conversation.id);
        let user_message = Message::user(&conversation.id, content);

        // ---- history ----
        let history = if config.history_buffer_size == 0 {
            Vec::new()
        } else {
            self.messages
                .recent_messages(&conversation.id, config.history_buffer_size)
                .await
                .map_err(|e| turn.fail(ChatError::HistoryUnavailable(e)))?
        };
        let window = ContextWindow::new(config.history_buffer_size).with_recent(&history);
        turn.advance();

        // ---- prompt ----
        // Echo turns send nothing to a backend, so the decks are not consulted.
        let system_prompt = match conversation.conversation_type {
            ConversationType::Gpt => self
                .prompts
                .assemble(&config.role_definition)
                .await
                .map_err(|e| turn.fail(ChatError::Deck(e)))?,
            ConversationType::Tts => String::new(),
        };
        turn.advance();

        // ---- backend ----
        let replies: Vec<(Message, ReplyKind)> = match conversation.conversation_type {
            ConversationType::Gpt => {
                let params = CompletionParams::for_conversation(conversation.engine, config);
                let context = window.build(&system_prompt, content);
                let provider = self.providers.resolve(conversation.engine);
                log::debug!(
                    "chat: [{}] dispatching to {} (model={}, messages={})",
                    conversation.id,
                    conversation.engine,
                    params.model,
                    context.len()
                );

                match complete_or_degrade(provider.as_ref(), &context, &params, || {
                    format!("{system_prompt}{content}")
                })
                .await
                {
                    Completion::Generated(texts) => texts
                        .into_iter()
                        .map(|text| {
                            (Message::assistant(&conversation.id, text), ReplyKind::Generated)
                        })
                        .collect(),
                    Completion::Degraded { text, .. } => {
                        vec![(Message::assistant(&conversation.id, text), ReplyKind::Degraded)]
                    }
                }
            }
            ConversationType::Tts => {
                vec![(Message::assistant(&conversation.id, content), ReplyKind::Echo)]
            }
        };
        turn.advance();

        // ---- persist ----
        let mut batch = Vec::with_capacity(replies.len() + 1);
        batch.push(user_message);
        batch.extend(replies.iter().map(|(message, _)| message.clone()));
        self.messages
            .create_messages(batch)
            .await
            .map_err(|e| turn.fail(ChatError::PersistenceFailed(e)))?;
        turn.advance();

        // ---- speech ----
        let mut out = Vec::with_capacity(replies.len());
        for (message, kind) in replies {
            let speech = match (&self.speech, conversation.conversation_type) {
                (Some(service), ConversationType::Tts) => {
                    match service.speak_message(&message, &config.tts).await {
                        Ok(speech) => Some(speech),
                        Err(e) => {
                            log::warn!(
                                "chat: [{}] speech for {} failed: {e}",
                                conversation.id,
                                message.id
                            );
                            None
                        }
                    }
                }
                _ => None,
            };
            out.push(Reply {
                message,
                kind,
                speech,
            });
        }

        turn.advance();
        log::info!(
            "chat: [{}] {} replies returned",
            conversation.id,
            out.len()
        );
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
