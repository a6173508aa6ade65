//! Message-to-speech: markup, synthesis and persistence in one call.

use std::sync::Arc;

use crate::chat::{Message, TtsConfig};
use crate::speech::ssml::generate_ssml;
use crate::speech::synth::SpeechSynthesizer;
use crate::speech::voices::VoiceRoster;
use crate::speech::{Speech, SpeechError};
use crate::store::SpeechStore;

pub struct SpeechService {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    store: Arc<dyn SpeechStore>,
    roster: VoiceRoster,
    locale: String,
}

impl SpeechService {
    pub fn new(
        synthesizer: Arc<dyn SpeechSynthesizer>,
        store: Arc<dyn SpeechStore>,
        roster: VoiceRoster,
        locale: impl Into<String>,
    ) -> Self {
        Self {
            synthesizer,
            store,
            roster,
            locale: locale.into(),
        }
    }

    /// Synthesise `message` and persist the resulting [`Speech`], keyed to
    /// the message id.
    pub async fn speak_message(
        &self,
        message: &Message,
        tts: &TtsConfig,
    ) -> Result<Speech, SpeechError> {
        if message.content.trim().is_empty() {
            return Err(SpeechError::EmptyText);
        }

        let voices = self.roster.voices(&self.locale);
        let ssml = generate_ssml(&message.content, &self.locale, &voices)?;
        let audio = self.synthesizer.synthesize(&ssml).await?;

        let speech = Speech::for_message(&message.id, &message.content, tts.clone(), audio);
        Ok(self.store.create_speech(speech).await?)
    }
}
