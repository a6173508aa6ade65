//! Audio concatenation through ffmpeg's concat demuxer.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;

use crate::export::ExportError;

/// Joins media files, in order, into one output file.
#[async_trait]
pub trait MediaConcatenator: Send + Sync {
    async fn concat(&self, inputs: &[PathBuf], output: &Path) -> Result<(), ExportError>;
}

pub struct FfmpegConcat {
    binary: String,
}

impl FfmpegConcat {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

/// Contents of a concat-demuxer list file: one `file '<path>'` per input.
pub(crate) fn concat_list(inputs: &[PathBuf]) -> String {
    inputs
        .iter()
        .map(|path| {
            let quoted = path.to_string_lossy().replace('\'', "'\\''");
            format!("file '{quoted}'\n")
        })
        .collect()
}

#[async_trait]
impl MediaConcatenator for FfmpegConcat {
    async fn concat(&self, inputs: &[PathBuf], output: &Path) -> Result<(), ExportError> {
        let list_path = output.with_extension("txt");
        tokio::fs::write(&list_path, concat_list(inputs)).await?;

        log::info!(
            "export: concatenating {} files into {}",
            inputs.len(),
            output.display()
        );

        let result = Command::new(&self.binary)
            .args(["-y", "-f", "concat", "-safe", "0", "-i"])
            .arg(&list_path)
            .args(["-c", "copy"])
            .arg(output)
            .output()
            .await;

        if let Err(e) = tokio::fs::remove_file(&list_path).await {
            log::debug!("export: could not remove {}: {e}", list_path.display());
        }

        let output_status = result.map_err(|e| {
            ExportError::ExportToolFailed(format!("could not run {}: {e}", self.binary))
        })?;

        if !output_status.status.success() {
            let stderr = String::from_utf8_lossy(&output_status.stderr);
            log::error!("export: {} exited with {}", self.binary, output_status.status);
            return Err(ExportError::ExportToolFailed(format!(
                "{} exited with {}: {}",
                self.binary,
                output_status.status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn list_quotes_each_input() {
        let list = concat_list(&[
            PathBuf::from("/lib/a.mp3"),
            PathBuf::from("/lib/l'été.mp3"),
        ]);
        assert_eq!(list, "file '/lib/a.mp3'\nfile '/lib/l'\\''été.mp3'\n");
    }

    #[tokio::test]
    async fn missing_binary_is_a_tool_failure() {
        let dir = TempDir::new().unwrap();
        let concat = FfmpegConcat::new("definitely-not-a-real-ffmpeg-binary");
        let result = concat
            .concat(&[dir.path().join("a.mp3")], &dir.path().join("out.mp3"))
            .await;

        assert!(matches!(result, Err(ExportError::ExportToolFailed(_))));
        // The list file is cleaned up either way.
        assert!(!dir.path().join("out.txt").exists());
    }
}
