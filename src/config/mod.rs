//! Configuration module for the conversation engine.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for each subsystem,
//! `AppPaths` for cross-platform directories, and TOML persistence via
//! `AppConfig::load` / `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{
    AnkiConfig, AppConfig, AzureConfig, DeckConfig, EnjoyAiConfig, LibraryConfig, OllamaConfig,
    OpenAiConfig, ProvidersConfig, SpeechConfig,
};
