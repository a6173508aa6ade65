//! Per-turn state machine of the chat orchestrator.

// ---------------------------------------------------------------------------
// TurnState
// ---------------------------------------------------------------------------

/// States a chat turn passes through.
///
/// ```text
/// Received ─▶ HistoryLoaded ─▶ PromptBuilt ─▶ BackendCalled ─▶ Persisted ─▶ Returned
///    └───────────────┴──────────────┴───────────────┴──── error ──▶ Failed
/// ```
///
/// A failed backend call does not lead to `Failed`; the turn continues with
/// a degraded reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnState {
    /// The user message has been accepted.
    #[default]
    Received,
    /// Prior messages for the context window are loaded.
    HistoryLoaded,
    /// The system prompt has been assembled.
    PromptBuilt,
    /// Replies are available (generated, degraded or echoed).
    BackendCalled,
    /// The user message and replies are stored.
    Persisted,
    /// Replies were handed back to the caller.
    Returned,
    /// The turn was abandoned; nothing was returned.
    Failed,
}

impl TurnState {
    /// The state that follows on success, or `None` for terminal states.
    ///
    /// ```
    /// use lingo_engine::chat::TurnState;
    ///
    /// assert_eq!(TurnState::Received.next(), Some(TurnState::HistoryLoaded));
    /// assert_eq!(TurnState::Persisted.next(), Some(TurnState::Returned));
    /// assert_eq!(TurnState::Returned.next(), None);
    /// ```
    pub fn next(self) -> Option<TurnState> {
        match self {
            TurnState::Received => Some(TurnState::HistoryLoaded),
            TurnState::HistoryLoaded => Some(TurnState::PromptBuilt),
            TurnState::PromptBuilt => Some(TurnState::BackendCalled),
            TurnState::BackendCalled => Some(TurnState::Persisted),
            TurnState::Persisted => Some(TurnState::Returned),
            TurnState::Returned | TurnState::Failed => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, TurnState::Returned | TurnState::Failed)
    }

    /// Short label for logs.
    pub fn label(self) -> &'static str {
        match self {
            TurnState::Received => "received",
            TurnState::HistoryLoaded => "history-loaded",
            TurnState::PromptBuilt => "prompt-built",
            TurnState::BackendCalled => "backend-called",
            TurnState::Persisted => "persisted",
            TurnState::Returned => "returned",
            TurnState::Failed => "failed",
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
