//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across tasks.
//! Every section is `#[serde(default)]`, so a partial `settings.toml` only
//! needs the keys the user actually changed.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;
use crate::provider::Engine;

// ---------------------------------------------------------------------------
// Flashcard service
// ---------------------------------------------------------------------------

/// Deck names configured for one learning language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckConfig {
    /// Learning language the decks belong to (e.g. `"fr-FR"`).
    pub language: String,
    /// Deck holding learned words and phrases.
    pub words_deck: String,
    /// Deck holding learned grammar notes.
    pub grammar_deck: String,
}

/// Connection settings for the remote flashcard service (AnkiConnect).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnkiConfig {
    /// Endpoint accepting action-tagged JSON bodies.
    pub url: String,
    /// API key sent with every request; `None` when the endpoint is open.
    pub key: Option<String>,
    /// How long a fetched deck stays valid, in seconds.
    pub cache_ttl_secs: u64,
    /// Number of card ids sent per `cardsInfo` request.
    pub batch_size: usize,
    /// Per-request timeout for the flashcard endpoint.
    pub timeout_secs: u64,
    /// Per-language deck names.
    pub decks: Vec<DeckConfig>,
}

impl Default for AnkiConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8765".into(),
            key: None,
            cache_ttl_secs: 60 * 60,
            batch_size: 500,
            timeout_secs: 30,
            decks: Vec::new(),
        }
    }
}

impl DeckConfig {
    /// The entry of `decks` configured for `language`, if any.
    pub fn find<'a>(decks: &'a [DeckConfig], language: &str) -> Option<&'a DeckConfig> {
        decks.iter().find(|deck| deck.language == language)
    }
}

// ---------------------------------------------------------------------------
// Chat backends
// ---------------------------------------------------------------------------

/// Hosted aggregator, authenticated with the user's session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnjoyAiConfig {
    /// Root of the hosted API; completions live under `{api_url}/api/ai`.
    pub api_url: String,
    /// Session token of the signed-in user.
    pub access_token: Option<String>,
}

impl Default for EnjoyAiConfig {
    fn default() -> Self {
        Self {
            api_url: "https://enjoy.bot".into(),
            access_token: None,
        }
    }
}

/// Direct provider authenticated with an API key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    pub key: String,
    /// Overrides the default `https://api.openai.com/v1`.
    pub base_url: Option<String>,
}

/// Self-hosted provider reachable on the local network.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub base_url: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: Engine::Ollama
                .info()
                .default_base_url
                .unwrap_or_default()
                .to_string(),
        }
    }
}

/// Credentials and endpoints for all completion backends.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// Per-request timeout applied to every backend call.
    pub timeout_secs: u64,
    pub enjoyai: EnjoyAiConfig,
    /// `None` until the user has entered an API key.
    pub openai: Option<OpenAiConfig>,
    pub ollama: OllamaConfig,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 60,
            enjoyai: EnjoyAiConfig::default(),
            openai: None,
            ollama: OllamaConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Speech
// ---------------------------------------------------------------------------

/// Credentials for the remote speech-synthesis service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AzureConfig {
    pub key: Option<String>,
    pub region: Option<String>,
    /// Value of the `X-Microsoft-OutputFormat` header.
    pub output_format: String,
}

impl Default for AzureConfig {
    fn default() -> Self {
        Self {
            key: None,
            region: None,
            output_format: "audio-24khz-48kbitrate-mono-mp3".into(),
        }
    }
}

/// Voice roster overrides, keyed by locale (e.g. `"fr-FR"`).
///
/// Locales without an entry use the built-in rosters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    pub voices: HashMap<String, Vec<String>>,
}

// ---------------------------------------------------------------------------
// Library / export
// ---------------------------------------------------------------------------

/// Media library location and the external concatenation tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Library root; `None` uses the platform data directory.
    pub library_dir: Option<PathBuf>,
    /// Export cache; `None` uses `{library_dir}/cache`.
    pub cache_dir: Option<PathBuf>,
    /// Name or path of the ffmpeg binary.
    pub ffmpeg: String,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            library_dir: None,
            cache_dir: None,
            ffmpeg: "ffmpeg".into(),
        }
    }
}

impl LibraryConfig {
    /// Resolved library root.
    pub fn library_dir(&self) -> PathBuf {
        self.library_dir
            .clone()
            .unwrap_or_else(|| AppPaths::new().library_dir)
    }

    /// Resolved export cache directory.
    pub fn cache_dir(&self) -> PathBuf {
        self.cache_dir
            .clone()
            .unwrap_or_else(|| self.library_dir().join("cache"))
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// ```rust,no_run
/// use lingo_engine::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
/// assert!(!config.learning_language.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Locale of the language being learned (e.g. `"en-US"`, `"fr-FR"`).
    pub learning_language: String,
    pub anki: AnkiConfig,
    pub providers: ProvidersConfig,
    pub azure: AzureConfig,
    pub speech: SpeechConfig,
    pub library: LibraryConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            learning_language: "en-US".into(),
            anki: AnkiConfig::default(),
            providers: ProvidersConfig::default(),
            azure: AzureConfig::default(),
            speech: SpeechConfig::default(),
            library: LibraryConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        let default = AppConfig::default();

        assert_eq!(config.learning_language, default.learning_language);
        assert_eq!(config.anki.url, default.anki.url);
        assert_eq!(config.providers.ollama.base_url, default.providers.ollama.base_url);
    }

    #[test]
    fn default_values() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.learning_language, "en-US");
        assert_eq!(cfg.anki.cache_ttl_secs, 3600);
        assert_eq!(cfg.anki.batch_size, 500);
        assert!(cfg.anki.decks.is_empty());
        assert!(cfg.providers.openai.is_none());
        assert_eq!(cfg.providers.ollama.base_url, "http://localhost:11434");
        assert_eq!(cfg.library.ffmpeg, "ffmpeg");
    }

    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modified.toml");

        let mut cfg = AppConfig::default();
        cfg.learning_language = "fr-FR".into();
        cfg.anki.key = Some("anki-secret".into());
        cfg.anki.decks.push(DeckConfig {
            language: "fr-FR".into(),
            words_deck: "Français::Mots".into(),
            grammar_deck: "Français::Grammaire".into(),
        });
        cfg.providers.openai = Some(OpenAiConfig {
            key: "sk-test".into(),
            base_url: Some("https://proxy.example.com/v1".into()),
        });
        cfg.azure.region = Some("westeurope".into());
        cfg.speech
            .voices
            .insert("fr-FR".into(), vec!["fr-FR-DeniseNeural".into()]);
        cfg.library.cache_dir = Some(PathBuf::from("/tmp/lingo-cache"));

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded.learning_language, "fr-FR");
        assert_eq!(loaded.anki.key.as_deref(), Some("anki-secret"));
        assert_eq!(loaded.anki.decks, cfg.anki.decks);
        let openai = loaded.providers.openai.expect("openai section");
        assert_eq!(openai.key, "sk-test");
        assert_eq!(openai.base_url.as_deref(), Some("https://proxy.example.com/v1"));
        assert_eq!(loaded.azure.region.as_deref(), Some("westeurope"));
        assert_eq!(loaded.speech.voices["fr-FR"], vec!["fr-FR-DeniseNeural"]);
        assert_eq!(loaded.library.cache_dir(), PathBuf::from("/tmp/lingo-cache"));
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("partial.toml");
        std::fs::write(
            &path,
            "learning_language = \"fr-FR\"\n\n[anki]\nurl = \"http://anki.local:8765\"\n",
        )
        .expect("write");

        let loaded = AppConfig::load_from(&path).expect("load");
        assert_eq!(loaded.learning_language, "fr-FR");
        assert_eq!(loaded.anki.url, "http://anki.local:8765");
        assert_eq!(loaded.anki.batch_size, 500);
        assert_eq!(loaded.anki.timeout_secs, 30);
        assert_eq!(loaded.providers.timeout_secs, 60);
    }

    #[test]
    fn deck_lookup_matches_language() {
        let decks = vec![DeckConfig {
            language: "fr-FR".into(),
            words_deck: "W".into(),
            grammar_deck: "G".into(),
        }];
        assert_eq!(
            DeckConfig::find(&decks, "fr-FR").map(|d| d.words_deck.as_str()),
            Some("W")
        );
        assert!(DeckConfig::find(&decks, "de-DE").is_none());
    }

    #[test]
    fn local_provider_defaults_to_registry_endpoint() {
        assert_eq!(
            Some(OllamaConfig::default().base_url.as_str()),
            Engine::Ollama.info().default_base_url
        );
    }

    #[test]
    fn cache_dir_defaults_under_library() {
        let library = LibraryConfig {
            library_dir: Some(PathBuf::from("/data/library")),
            ..LibraryConfig::default()
        };
        assert_eq!(library.cache_dir(), PathBuf::from("/data/library/cache"));
    }
}
