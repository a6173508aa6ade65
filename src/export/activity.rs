//! Practice activity over a time range: overall totals, attempts per day
//! and per-target daily summaries.
//!
//! Days are calendar dates in UTC.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::export::{Recording, TargetType};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingTotals {
    pub count: usize,
    /// Milliseconds.
    pub total_duration: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: usize,
}

/// Attempts made against one target on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetActivity {
    pub date: NaiveDate,
    pub target_id: String,
    pub target_type: TargetType,
    pub count: usize,
    pub total_duration: u64,
}

/// Everything [`RecordingExporter::activity`](crate::export::RecordingExporter::activity) reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub totals: RecordingTotals,
    pub daily: Vec<DailyCount>,
    pub by_target: Vec<TargetActivity>,
}

impl Activity {
    pub fn from_recordings(recordings: &[Recording]) -> Self {
        Self {
            totals: totals(recordings),
            daily: group_by_date(recordings),
            by_target: group_by_target(recordings),
        }
    }
}

pub fn totals(recordings: &[Recording]) -> RecordingTotals {
    recordings
        .iter()
        .fold(RecordingTotals::default(), |acc, r| RecordingTotals {
            count: acc.count + 1,
            total_duration: acc.total_duration + r.duration,
        })
}

/// Attempt count per day, oldest day first.
pub fn group_by_date(recordings: &[Recording]) -> Vec<DailyCount> {
    let mut days: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for recording in recordings {
        *days.entry(recording.created_at.date_naive()).or_default() += 1;
    }
    days.into_iter()
        .map(|(date, count)| DailyCount { date, count })
        .collect()
}

/// One row per (day, target), newest day first and busiest target first
/// within a day.
pub fn group_by_target(recordings: &[Recording]) -> Vec<TargetActivity> {
    let mut groups: BTreeMap<(NaiveDate, &str, TargetType), TargetActivity> = BTreeMap::new();
    for recording in recordings {
        let date = recording.created_at.date_naive();
        let row = groups
            .entry((date, recording.target_id.as_str(), recording.target_type))
            .or_insert_with(|| TargetActivity {
                date,
                target_id: recording.target_id.clone(),
                target_type: recording.target_type,
                count: 0,
                total_duration: 0,
            });
        row.count += 1;
        row.total_duration += recording.duration;
    }

    let mut rows: Vec<TargetActivity> = groups.into_values().collect();
    // Stable: equal (date, count) keep target id order.
    rows.sort_by_key(|row| (Reverse(row.date), Reverse(row.count)));
    rows
}
