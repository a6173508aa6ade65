//! Cross-platform application paths using the `dirs` crate.
//!
//! Layout:
//!
//! Config dir (settings):
//!   Windows: %APPDATA%\lingo\
//!   macOS:   ~/Library/Application Support/lingo/
//!   Linux:   ~/.config/lingo/
//!
//! Data dir (library, store snapshot, export cache):
//!   Windows: %LOCALAPPDATA%\lingo\
//!   macOS:   ~/Library/Application Support/lingo/
//!   Linux:   ~/.local/share/lingo/

use std::path::PathBuf;

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory for `settings.toml`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Root of the media library (`enjoy://library/...` URLs resolve here).
    pub library_dir: PathBuf,
    /// Default location of the JSON store snapshot used by the CLI.
    pub store_file: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "lingo";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path.
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let library_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let settings_file = config_dir.join("settings.toml");
        let store_file = library_dir.join("store.json");

        Self {
            config_dir,
            settings_file,
            library_dir,
            store_file,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
