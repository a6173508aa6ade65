//! Speech output: multi-voice SSML, remote synthesis and speech records.

pub mod model;
pub mod service;
pub mod ssml;
pub mod synth;
pub mod voices;

use thiserror::Error;

use crate::store::StoreError;

pub use model::{Speech, SpeechSourceType, AUDIO_MP3};
pub use service::SpeechService;
pub use ssml::{generate_ssml, generate_ssml_with_rng};
pub use synth::{AzureSynthesizer, SpeechSynthesizer};
pub use voices::VoiceRoster;

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("no voices available for {0}")]
    EmptyRoster(String),

    #[error("nothing to synthesise")]
    EmptyText,

    #[error("could not build markup: {0}")]
    Markup(String),

    #[error("speech service key or region is not configured")]
    MissingCredentials,

    #[error("speech request failed: {0}")]
    Request(String),

    #[error("speech service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}
