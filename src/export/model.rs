//! Practice targets, recorded attempts and their assessments.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TargetType {
    Audio,
    Video,
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TargetType::Audio => "Audio",
            TargetType::Video => "Video",
        })
    }
}

/// The audio or video a learner practises against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub id: String,
    pub target_type: TargetType,
    pub name: String,
    pub src: String,
}

/// One recorded attempt at a reference sentence of a target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recording {
    pub id: String,
    pub target_id: String,
    pub target_type: TargetType,
    pub reference_id: i64,
    pub reference_text: String,
    /// Length of the attempt in milliseconds.
    pub duration: u64,
    pub src: String,
    pub created_at: DateTime<Utc>,
}

impl Recording {
    pub fn new(
        target: &Target,
        reference_id: i64,
        reference_text: impl Into<String>,
        duration: u64,
        src: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            target_id: target.id.clone(),
            target_type: target.target_type,
            reference_id,
            reference_text: reference_text.into(),
            duration,
            src: src.into(),
            created_at: Utc::now(),
        }
    }
}

/// Pronunciation score attached to a recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PronunciationAssessment {
    pub id: String,
    pub recording_id: String,
    pub pronunciation_score: f64,
    pub created_at: DateTime<Utc>,
}

impl PronunciationAssessment {
    pub fn new(recording_id: impl Into<String>, pronunciation_score: f64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            recording_id: recording_id.into(),
            pronunciation_score,
            created_at: Utc::now(),
        }
    }
}

/// A recording joined to its best assessment score, if it has any.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRecording {
    pub recording: Recording,
    pub best_score: Option<f64>,
}

/// Per-reference summary of a target's recordings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentStats {
    pub reference_id: i64,
    pub reference_text: String,
    pub count: usize,
    pub total_duration: u64,
    pub best_score: Option<f64>,
}
