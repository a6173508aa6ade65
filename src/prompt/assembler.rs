//! System-prompt assembly from a conversation's role-definition template.
//!
//! Templates may contain three reserved tokens:
//! * `wordDeck`: replaced by the learner's words deck, appended at the end.
//! * `grammarDeck`: replaced by the learner's grammar deck, appended after
//!   the words block.
//! * `clearAndReturnOriginal`: the whole system prompt becomes empty.
//!
//! The language is fixed at construction time; French has its own preamble
//! sentences and every other language falls back to English.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::anki::{DeckCache, DeckError};

pub const WORD_DECK_TOKEN: &str = "wordDeck";
pub const GRAMMAR_DECK_TOKEN: &str = "grammarDeck";
pub const CLEAR_TOKEN: &str = "clearAndReturnOriginal";

static WORD_DECK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bwordDeck\b").expect("static regex"));
static GRAMMAR_DECK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bgrammarDeck\b").expect("static regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));

// ---------------------------------------------------------------------------
// Preambles
// ---------------------------------------------------------------------------

struct Preamble {
    words: &'static str,
    grammar: &'static str,
}

const PREAMBLE_EN: Preamble = Preamble {
    words: "Here are the words/phrases etc I learned:",
    grammar: "The following are what I learned about sentence structure, grammar etc:",
};

const PREAMBLE_FR: Preamble = Preamble {
    words: "Voici les mots/phrases, etc., que j'ai appris :",
    grammar: "Ce qui suit est ce que j'ai appris sur la structure des phrases, la grammaire, etc.:",
};

fn preamble(language: &str) -> &'static Preamble {
    match language.split(['-', '_']).next().unwrap_or_default() {
        "fr" => &PREAMBLE_FR,
        _ => &PREAMBLE_EN,
    }
}

// ---------------------------------------------------------------------------
// PromptAssembler
// ---------------------------------------------------------------------------

/// Builds the system instruction for one learning language.
///
/// # Example
/// ```rust,no_run
/// use std::sync::Arc;
/// use lingo_engine::anki::DeckCache;
/// use lingo_engine::config::AnkiConfig;
/// use lingo_engine::prompt::PromptAssembler;
///
/// # async fn demo() -> Result<(), lingo_engine::anki::DeckError> {
/// let decks = Arc::new(DeckCache::from_config(&AnkiConfig::default()));
/// let assembler = PromptAssembler::new(decks, "fr-FR");
/// let system = assembler.assemble("Tu es mon professeur. wordDeck").await?;
/// assert!(!system.contains("wordDeck"));
/// # Ok(())
/// # }
/// ```
pub struct PromptAssembler {
    decks: Arc<DeckCache>,
    language: String,
}

impl PromptAssembler {
    pub fn new(decks: Arc<DeckCache>, language: impl Into<String>) -> Self {
        Self {
            decks,
            language: language.into(),
        }
    }

    /// Expand `template` into the final system instruction.
    ///
    /// The deck cache is only consulted for tokens actually present, and not
    /// at all when the clear token is present.
    pub async fn assemble(&self, template: &str) -> Result<String, DeckError> {
        if template.contains(CLEAR_TOKEN) {
            log::debug!("prompt: clear token present, system prompt is empty");
            return Ok(String::new());
        }

        let preamble = preamble(&self.language);
        let mut body = template.to_string();
        let mut appendix = String::new();

        if WORD_DECK_RE.is_match(&body) {
            let deck = self.decks.word_deck(&self.language).await?;
            body = WORD_DECK_RE.replace_all(&body, "").into_owned();
            append_block(&mut appendix, preamble.words, &deck);
        }

        if GRAMMAR_DECK_RE.is_match(&body) {
            let deck = self.decks.grammar_deck(&self.language).await?;
            body = GRAMMAR_DECK_RE.replace_all(&body, "").into_owned();
            append_block(&mut appendix, preamble.grammar, &deck);
        }

        body.push_str(&appendix);
        Ok(collapse_whitespace(&body))
    }
}

fn append_block(out: &mut String, preamble: &str, entries: &[String]) {
    out.push(' ');
    out.push_str(preamble);
    out.push('\n');
    out.push_str(&entries.join(", "));
    out.push('.');
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
