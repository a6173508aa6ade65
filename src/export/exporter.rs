//! Best-of export for a practice target.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::config::LibraryConfig;
use crate::export::concat::{FfmpegConcat, MediaConcatenator};
use crate::export::locator::MediaLocator;
use crate::export::select::{segment_stats, select_best};
use crate::export::{Activity, ExportError, SegmentStats, TargetType};
use crate::store::RecordingStore;

pub struct RecordingExporter {
    store: Arc<dyn RecordingStore>,
    concatenator: Arc<dyn MediaConcatenator>,
    locator: MediaLocator,
    cache_dir: PathBuf,
}

impl RecordingExporter {
    pub fn new(
        store: Arc<dyn RecordingStore>,
        concatenator: Arc<dyn MediaConcatenator>,
        locator: MediaLocator,
        cache_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            concatenator,
            locator,
            cache_dir: cache_dir.into(),
        }
    }

    /// Exporter using ffmpeg and the library/cache directories from config.
    pub fn from_config(store: Arc<dyn RecordingStore>, config: &LibraryConfig) -> Self {
        Self::new(
            store,
            Arc::new(FfmpegConcat::new(config.ffmpeg.clone())),
            MediaLocator::new(config.library_dir()),
            config.cache_dir(),
        )
    }

    /// Concatenate the best attempt of every reference sentence of the target
    /// into `{cache_dir}/{type}-{id}.mp3` and return its library URL.
    pub async fn export(
        &self,
        target_id: &str,
        target_type: TargetType,
    ) -> Result<String, ExportError> {
        if !is_safe_file_stem(target_id) {
            return Err(ExportError::InvalidTargetId(target_id.to_string()));
        }

        self.store
            .find_target(target_id, target_type)
            .await?
            .ok_or_else(|| ExportError::TargetNotFound {
                target_type,
                target_id: target_id.to_string(),
            })?;

        let recordings = self.store.scored_recordings(target_id, target_type).await?;
        if recordings.is_empty() {
            return Err(ExportError::NoRecordings(target_id.to_string()));
        }

        let chosen = select_best(recordings);
        log::info!(
            "export: {target_type} {target_id}: {} segments selected",
            chosen.len()
        );
        let inputs: Vec<PathBuf> = chosen
            .iter()
            .map(|scored| self.locator.to_path(&scored.recording.src))
            .collect();

        tokio::fs::create_dir_all(&self.cache_dir).await?;
        let output = self.cache_dir.join(format!("{target_type}-{target_id}.mp3"));
        self.concatenator.concat(&inputs, &output).await?;

        Ok(self.locator.to_url(&output))
    }

    /// Per-segment summary of a target's recordings.
    pub async fn stats(
        &self,
        target_id: &str,
        target_type: TargetType,
    ) -> Result<Vec<SegmentStats>, ExportError> {
        let recordings = self.store.scored_recordings(target_id, target_type).await?;
        Ok(segment_stats(&recordings))
    }

    /// Totals, per-day counts and per-target rows for recordings made
    /// within `from..=to`.
    pub async fn activity(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Activity, ExportError> {
        let recordings = self.store.recordings_between(from, to).await?;
        log::debug!("export: {} recordings between {from} and {to}", recordings.len());
        Ok(Activity::from_recordings(&recordings))
    }
}

/// `true` when `id` names a single file inside the cache directory.
fn is_safe_file_stem(id: &str) -> bool {
    !id.is_empty()
        && !id.starts_with('.')
        && !id.chars().any(|c| c == '/' || c == '\\' || c.is_control())
}
