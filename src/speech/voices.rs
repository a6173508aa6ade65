//! Speaker rosters for multi-voice markup.
//!
//! A roster may list a voice more than once; duplicates make that voice
//! proportionally more likely to be picked.

use std::collections::HashMap;

const FRENCH: &[&str] = &[
    "fr-FR-CelesteNeural",
    "fr-FR-CelesteNeural",
    "fr-FR-HenriNeural",
    "fr-FR-AlainNeural",
    "fr-FR-ClaudeNeural",
    "fr-FR-MauriceNeural",
    "fr-FR-JosephineNeural",
    "fr-FR-YvetteNeural",
    "fr-FR-EloiseNeural",
    "fr-FR-JeromeNeural",
    "fr-FR-CoralieNeural",
    "fr-FR-JacquelineNeural",
    "fr-FR-YvesNeural",
    "fr-FR-DeniseNeural",
];

const ENGLISH: &[&str] = &[
    "en-US-AvaNeural",
    "en-US-AndrewNeural",
    "en-US-EmmaNeural",
    "en-US-BrianNeural",
    "en-US-JennyNeural",
    "en-US-GuyNeural",
    "en-US-AriaNeural",
    "en-US-DavisNeural",
];

/// Resolves the roster for a locale, preferring configured overrides.
#[derive(Debug, Clone, Default)]
pub struct VoiceRoster {
    overrides: HashMap<String, Vec<String>>,
}

impl VoiceRoster {
    pub fn new(overrides: HashMap<String, Vec<String>>) -> Self {
        Self { overrides }
    }

    /// Voices for `locale`.  Unknown locales get the English roster.
    pub fn voices(&self, locale: &str) -> Vec<String> {
        if let Some(voices) = self.overrides.get(locale).filter(|v| !v.is_empty()) {
            return voices.clone();
        }
        let builtin = match locale.split(['-', '_']).next().unwrap_or_default() {
            "fr" => FRENCH,
            _ => ENGLISH,
        };
        builtin.iter().map(|v| v.to_string()).collect()
    }
}
