//! Degraded-mode completion.
//!
//! A chat turn must always hand the UI a reply object.  When the backend call
//! fails, [`complete_or_degrade`] does not propagate the error; it returns
//! [`Completion::Degraded`] carrying the substitute text and the underlying
//! error, so callers (and tests) can tell the two outcomes apart.

use crate::llm::completion::{ChatMessage, CompletionParams, CompletionProvider, LlmError};

/// Outcome of a completion attempt that never fails.
#[derive(Debug)]
pub enum Completion {
    /// The backend produced one text per choice.
    Generated(Vec<String>),
    /// The backend call failed; `text` stands in for the reply.
    Degraded { text: String, error: LlmError },
}

/// Attempt the completion; on any [`LlmError`] return
/// [`Completion::Degraded`] with the text produced by `degraded`.
///
/// `degraded` is only evaluated on failure.
pub async fn complete_or_degrade<F>(
    provider: &dyn CompletionProvider,
    context: &[ChatMessage],
    params: &CompletionParams,
    degraded: F,
) -> Completion
where
    F: FnOnce() -> String,
{
    match provider.complete(context, params).await {
        Ok(texts) => Completion::Generated(texts),
        Err(error) => {
            log::warn!(
                "llm: completion failed ({error}), returning degraded reply (model={})",
                params.model
            );
            Completion::Degraded {
                text: degraded(),
                error,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
