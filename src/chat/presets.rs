//! Built-in conversation presets.
//!
//! Every preset uses the same sampling defaults (temperature 0.2, one
//! choice, 2048 tokens, no penalties, no history); they differ in engine,
//! type and role definition.

use crate::chat::model::{Conversation, ConversationConfig, ConversationType};
use crate::provider::Engine;

// ---------------------------------------------------------------------------
// Role definitions
// ---------------------------------------------------------------------------

const FRENCH_COACH: &str = "\
Sois mon coach de français. Génère du matériel d'apprentissage à partir des mots, \
expressions et structures de grammaire que je te donne. Pour chaque élément, donne le \
sens le plus courant et le deuxième sens le plus courant, chacun avec 5 phrases \
d'exemple sans numérotation. Explique avec un vocabulaire de base limité et n'utilise \
dans les exemples que ce que j'ai déjà appris, sauf si c'est impossible.
Format de réponse :
A. (nature du mot) + (définition) :
 5 phrases d'exemple
B. (nature du mot) + (définition) :
 5 phrases d'exemple
wordDeck
grammarDeck
";

const ENGLISH_COACH_DECK: &str = "\
You are my English coach. Generate learning material from the words, phrases and \
grammar points I give you. For each one, give the most common and the second most \
common meaning, each with 5 example sentences without numbering. Explain with a \
limited defining vocabulary and use only what I have already learned in the \
examples, unless that is impossible.
Return format:
A. (part of speech) + (definition):
 5 example sentences
B. (part of speech) + (definition):
 5 example sentences
wordDeck
grammarDeck
";

const ENGLISH_COACH: &str = "\
You are my English coach. Rewrite what I say in English. Do not translate word for \
word: work out what I mean and reorganise it clearly. Use natural American English \
with everyday words, preferring phrasal verbs and idioms. Keep every sentence under \
20 words.";

// ---------------------------------------------------------------------------
// Preset
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preset {
    pub key: &'static str,
    pub name: &'static str,
    pub engine: Engine,
    pub conversation_type: ConversationType,
    pub model: &'static str,
    pub role_definition: &'static str,
}

impl Preset {
    /// Conversation configuration with the shared preset defaults.
    pub fn configuration(&self) -> ConversationConfig {
        ConversationConfig {
            model: self.model.to_string(),
            role_definition: self.role_definition.to_string(),
            ..ConversationConfig::default()
        }
    }
}

static PRESETS: [Preset; 4] = [
    Preset {
        key: "french-coach",
        name: "French coach",
        engine: Engine::EnjoyAi,
        conversation_type: ConversationType::Gpt,
        model: "gpt-4o",
        role_definition: FRENCH_COACH,
    },
    Preset {
        key: "english-coach-deck",
        name: "English coach (flashcards)",
        engine: Engine::EnjoyAi,
        conversation_type: ConversationType::Gpt,
        model: "gpt-4o",
        role_definition: ENGLISH_COACH_DECK,
    },
    Preset {
        key: "english-coach",
        name: "English coach",
        engine: Engine::EnjoyAi,
        conversation_type: ConversationType::Gpt,
        model: "gpt-4o",
        role_definition: ENGLISH_COACH,
    },
    Preset {
        key: "read-aloud",
        name: "Read aloud",
        engine: Engine::EnjoyAi,
        conversation_type: ConversationType::Tts,
        model: "gpt-4o",
        role_definition: "",
    },
];

pub fn presets() -> &'static [Preset] {
    &PRESETS
}

pub fn find(key: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|preset| preset.key == key)
}

impl Conversation {
    /// New conversation named after `preset` and configured from it.
    pub fn from_preset(preset: &Preset) -> Self {
        Conversation::new(
            preset.name,
            preset.engine,
            preset.conversation_type,
            preset.configuration(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::{GRAMMAR_DECK_TOKEN, WORD_DECK_TOKEN};

    #[test]
    fn keys_are_unique() {
        let mut keys: Vec<&str> = presets().iter().map(|p| p.key).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), presets().len());
    }

    #[test]
    fn deck_presets_carry_both_tokens() {
        for key in ["french-coach", "english-coach-deck"] {
            let preset = find(key).unwrap();
            assert!(preset.role_definition.contains(WORD_DECK_TOKEN), "{key}");
            assert!(preset.role_definition.contains(GRAMMAR_DECK_TOKEN), "{key}");
        }
        assert!(!find("english-coach").unwrap().role_definition.contains(WORD_DECK_TOKEN));
    }

    #[test]
    fn configuration_uses_shared_defaults() {
        let config = find("french-coach").unwrap().configuration();
        assert!((config.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.number_of_choices, 1);
        assert_eq!(config.max_tokens, Some(2048));
        assert_eq!(config.history_buffer_size, 0);
        assert_eq!(config.tts.model, "tts-1");
        assert_eq!(config.tts.voice, "alloy");
    }

    #[test]
    fn conversation_from_preset() {
        let preset = find("read-aloud").unwrap();
        let conversation = Conversation::from_preset(preset);
        assert_eq!(conversation.conversation_type, ConversationType::Tts);
        assert_eq!(conversation.engine, Engine::EnjoyAi);
        assert_eq!(conversation.name, "Read aloud");
    }

    #[test]
    fn unknown_key_is_none() {
        assert!(find("metaphor-pro").is_none());
    }
}
