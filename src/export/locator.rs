//! Mapping between `enjoy://library/...` URLs and files on disk.

use std::path::{Path, PathBuf};

pub const LIBRARY_URL_PREFIX: &str = "enjoy://library/";

#[derive(Debug, Clone)]
pub struct MediaLocator {
    library_dir: PathBuf,
}

impl MediaLocator {
    pub fn new(library_dir: impl Into<PathBuf>) -> Self {
        Self {
            library_dir: library_dir.into(),
        }
    }

    pub fn library_dir(&self) -> &Path {
        &self.library_dir
    }

    /// Local path for a media source.  Library URLs resolve under the
    /// library directory, `file://` URLs lose their scheme and anything
    /// else is taken as a path.
    pub fn to_path(&self, src: &str) -> PathBuf {
        if let Some(relative) = src.strip_prefix(LIBRARY_URL_PREFIX) {
            return relative
                .split('/')
                .filter(|part| !part.is_empty())
                .fold(self.library_dir.clone(), |path, part| path.join(part));
        }
        PathBuf::from(src.strip_prefix("file://").unwrap_or(src))
    }

    /// Library URL for a path under the library directory; other paths are
    /// returned as-is.
    pub fn to_url(&self, path: &Path) -> String {
        match path.strip_prefix(&self.library_dir) {
            Ok(relative) => {
                let parts: Vec<String> = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect();
                format!("{LIBRARY_URL_PREFIX}{}", parts.join("/"))
            }
            Err(_) => path.display().to_string(),
        }
    }
}
