//! Best-attempt selection and per-segment statistics.
//!
//! Both group a target's recordings by `reference_id` and emit groups in
//! ascending `reference_id` order.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::export::{ScoredRecording, SegmentStats};

/// One recording per `reference_id`: the highest score wins, and equal
/// scores go to the most recently created attempt.  An unscored attempt
/// ranks below any scored one.
pub fn select_best(recordings: Vec<ScoredRecording>) -> Vec<ScoredRecording> {
    let mut best: BTreeMap<i64, ScoredRecording> = BTreeMap::new();
    for candidate in recordings {
        match best.get(&candidate.recording.reference_id) {
            Some(current) if !outranks(&candidate, current) => {}
            _ => {
                best.insert(candidate.recording.reference_id, candidate);
            }
        }
    }
    best.into_values().collect()
}

fn outranks(a: &ScoredRecording, b: &ScoredRecording) -> bool {
    match compare_scores(a.best_score, b.best_score) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => a.recording.created_at > b.recording.created_at,
    }
}

fn compare_scores(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

/// Attempt count, summed duration and best score per `reference_id`.
pub fn segment_stats(recordings: &[ScoredRecording]) -> Vec<SegmentStats> {
    let mut stats: BTreeMap<i64, SegmentStats> = BTreeMap::new();
    for scored in recordings {
        let recording = &scored.recording;
        let entry = stats
            .entry(recording.reference_id)
            .or_insert_with(|| SegmentStats {
                reference_id: recording.reference_id,
                reference_text: recording.reference_text.clone(),
                count: 0,
                total_duration: 0,
                best_score: None,
            });
        entry.count += 1;
        entry.total_duration += recording.duration;
        if compare_scores(scored.best_score, entry.best_score) == Ordering::Greater {
            entry.best_score = scored.best_score;
        }
    }
    stats.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{Recording, Target, TargetType};
    use chrono::{Duration, Utc};

    fn attempt(reference_id: i64, score: Option<f64>, age_secs: i64) -> ScoredRecording {
        let target = Target {
            id: "t".into(),
            target_type: TargetType::Audio,
            name: "t".into(),
            src: "t.mp3".into(),
        };
        let mut recording = Recording::new(
            &target,
            reference_id,
            format!("sentence {reference_id}"),
            1_000,
            format!("{reference_id}-{score:?}-{age_secs}.mp3"),
        );
        recording.created_at = Utc::now() - Duration::seconds(age_secs);
        ScoredRecording {
            recording,
            best_score: score,
        }
    }

    #[test]
    fn picks_highest_score_per_reference_in_ascending_order() {
        // B is listed first to show ordering comes from reference_id.
        let b = attempt(2, Some(80.0), 30);
        let a70 = attempt(1, Some(70.0), 10);
        let a95 = attempt(1, Some(95.0), 20);

        let chosen = select_best(vec![b.clone(), a70, a95.clone()]);
        assert_eq!(chosen, vec![a95, b]);
    }

    #[test]
    fn tie_goes_to_most_recent() {
        let older = attempt(1, Some(90.0), 60);
        let newer = attempt(1, Some(90.0), 5);

        assert_eq!(select_best(vec![newer.clone(), older.clone()]), vec![newer.clone()]);
        assert_eq!(select_best(vec![older, newer.clone()]), vec![newer]);
    }

    #[test]
    fn scored_attempt_beats_unscored() {
        let unscored = attempt(3, None, 0);
        let scored = attempt(3, Some(1.0), 100);
        assert_eq!(select_best(vec![unscored, scored.clone()]), vec![scored]);
    }

    #[test]
    fn empty_input_selects_nothing() {
        assert!(select_best(Vec::new()).is_empty());
    }

    #[test]
    fn stats_aggregate_per_reference() {
        let rows = vec![
            attempt(5, Some(60.0), 3),
            attempt(2, None, 2),
            attempt(5, Some(75.5), 1),
        ];
        let stats = segment_stats(&rows);

        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].reference_id, 2);
        assert_eq!(stats[0].count, 1);
        assert_eq!(stats[0].best_score, None);
        assert_eq!(stats[1].reference_id, 5);
        assert_eq!(stats[1].count, 2);
        assert_eq!(stats[1].total_duration, 2_000);
        assert_eq!(stats[1].best_score, Some(75.5));
    }
}
