//! Recording aggregation and best-of export.
//!
//! For a practice target, [`RecordingExporter`] picks the best-scoring
//! attempt of every reference sentence ([`select_best`]) and hands the
//! ordered files to a [`MediaConcatenator`].

pub mod activity;
pub mod concat;
pub mod exporter;
pub mod locator;
pub mod model;
pub mod select;

use thiserror::Error;

use crate::store::StoreError;

pub use activity::{Activity, DailyCount, RecordingTotals, TargetActivity};
pub use concat::{FfmpegConcat, MediaConcatenator};
pub use exporter::RecordingExporter;
pub use locator::{MediaLocator, LIBRARY_URL_PREFIX};
pub use model::{
    PronunciationAssessment, Recording, ScoredRecording, SegmentStats, Target, TargetType,
};
pub use select::{segment_stats, select_best};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("{target_type} {target_id} not found")]
    TargetNotFound {
        target_type: TargetType,
        target_id: String,
    },

    /// The id cannot be used as part of the output file name.
    #[error("target id {0:?} is not a valid file name")]
    InvalidTargetId(String),

    #[error("no recordings for {0}")]
    NoRecordings(String),

    #[error("export tool failed: {0}")]
    ExportToolFailed(String),

    #[error("export I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}
