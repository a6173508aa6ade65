//! Flashcard decks from AnkiConnect.
//!
//! * [`AnkiClient`] speaks the action-tagged JSON protocol.
//! * [`AnkiDeckSource`] turns a deck name into its front-field texts,
//!   fetching card bodies in batches.
//! * [`DeckCache`] keeps each language's words and grammar decks for an hour.

pub mod cache;
pub mod client;

use thiserror::Error;

pub use cache::{CacheEntry, DeckCache, DeckKind};
pub use client::{AnkiApi, AnkiClient, AnkiDeckSource, CardField, CardInfo, DeckSource};

#[derive(Debug, Error)]
pub enum DeckError {
    #[error("no flashcard decks configured for {0}")]
    NotConfigured(String),

    #[error("flashcard fetch failed: {0}")]
    FetchFailed(String),
}
