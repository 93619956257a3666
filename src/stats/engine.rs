//! Derived statistics over a progress snapshot.
//!
//! Every function here is a pure function of its `Snapshot` argument: no
//! storage access, no clock, no mutation.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::Config;
use crate::core::position::{
    BlockKey, Position, BLOCKS_PER_DAY, DAYS_PER_WEEK, MAX_RATING, TOTAL_BLOCKS, TRACKED_WEEK,
};
use crate::core::records::{Project, RecallAttempt, Snapshot};
use crate::util::truncate_chars;

/// Mean confidence and score over all recall attempts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RecallAverages {
    pub avg_confidence: f64,
    pub avg_score: f64,
    /// Number of attempts averaged.
    pub attempts: usize,
}

/// Completed blocks for one day of the tracked week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayCompletion {
    pub day: u8,
    pub completed: u8,
    /// All blocks of the day are done.
    pub finished: bool,
}

/// Everything a progress view needs, computed in one pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateStats {
    pub total_blocks: u32,
    pub completed_count: u32,
    /// Percentage 0..=100.
    pub completion_rate: u8,
    pub position: Position,
    /// First incomplete block, which may differ from `position`.
    pub next_incomplete: Option<Position>,
    /// Percentage 0..=100.
    pub glossary_mastery: u8,
    pub by_day: Vec<DayCompletion>,
    /// `None` when no recall attempts exist.
    pub recall: Option<RecallAverages>,
    pub recall_attempts: usize,
    pub projects: usize,
    pub prompts: usize,
    pub glossary_terms_reviewed: usize,
}

/// Listing entry for a saved project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectSummary {
    pub name: String,
    pub day: u8,
    pub timestamp: DateTime<Utc>,
    pub preview: String,
}

/// Aggregates plus the config-limited listings shown beside them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressReport {
    pub stats: AggregateStats,
    /// Newest first.
    pub recent_recalls: Vec<RecallAttempt>,
    pub projects: Vec<ProjectSummary>,
}

/// Integer division rounding halves up, for non-negative operands.
fn round_ratio(numerator: u64, denominator: u64) -> u64 {
    (2 * numerator + denominator) / (2 * denominator)
}

/// Completed blocks in the tracked week.
pub fn completed_count(snapshot: &Snapshot) -> u32 {
    let count = snapshot
        .completions
        .iter()
        .filter(|(key, record)| key.week == TRACKED_WEEK && record.completed)
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Percentage of the tracked week's blocks completed, rounded.
pub fn completion_rate(snapshot: &Snapshot) -> u8 {
    let completed = u64::from(completed_count(snapshot));
    let rate = round_ratio(100 * completed, u64::from(TOTAL_BLOCKS)).min(100);
    rate as u8
}

/// Average glossary mastery as a percentage of the top rating, rounded.
///
/// Zero when no terms have been rated.
pub fn glossary_mastery(snapshot: &Snapshot) -> u8 {
    let reviewed = snapshot.glossary.len() as u64;
    if reviewed == 0 {
        return 0;
    }
    let total: u64 = snapshot
        .glossary
        .values()
        .map(|p| u64::from(p.mastery.value()))
        .sum();
    let pct = round_ratio(100 * total, reviewed * u64::from(MAX_RATING)).min(100);
    pct as u8
}

/// Completed blocks (0..=4) for one day of the tracked week.
///
/// Days outside the week count as zero.
pub fn completion_by_day(snapshot: &Snapshot, day: u8) -> u8 {
    (1..=BLOCKS_PER_DAY)
        .filter_map(|block| BlockKey::new(TRACKED_WEEK, day, block).ok())
        .filter(|key| snapshot.is_complete(key))
        .count() as u8
}

/// Per-day completion for every day of the tracked week.
pub fn completion_breakdown(snapshot: &Snapshot) -> Vec<DayCompletion> {
    (1..=DAYS_PER_WEEK)
        .map(|day| {
            let completed = completion_by_day(snapshot, day);
            DayCompletion {
                day,
                completed,
                finished: completed == BLOCKS_PER_DAY,
            }
        })
        .collect()
}

/// Mean confidence and score, or `None` with no attempts.
pub fn recall_averages(snapshot: &Snapshot) -> Option<RecallAverages> {
    let attempts = &snapshot.recall_attempts;
    if attempts.is_empty() {
        return None;
    }

    let n = attempts.len() as f64;
    let confidence: u32 = attempts.iter().map(|a| u32::from(a.confidence.value())).sum();
    let score: u32 = attempts.iter().map(|a| u32::from(a.score.value())).sum();

    Some(RecallAverages {
        avg_confidence: f64::from(confidence) / n,
        avg_score: f64::from(score) / n,
        attempts: attempts.len(),
    })
}

/// The last `limit` recall attempts, newest first.
pub fn recent_recalls(snapshot: &Snapshot, limit: usize) -> Vec<&RecallAttempt> {
    snapshot.recall_attempts.iter().rev().take(limit).collect()
}

/// First incomplete block of the tracked week in canonical order.
///
/// `None` once every block is done. This is derived from completion records
/// and is independent of the stored position pointer.
pub fn next_incomplete(snapshot: &Snapshot) -> Option<Position> {
    (1..=DAYS_PER_WEEK)
        .flat_map(|day| (1..=BLOCKS_PER_DAY).map(move |block| (day, block)))
        .find(|&(day, block)| {
            BlockKey::new(TRACKED_WEEK, day, block)
                .map(|key| !snapshot.is_complete(&key))
                .unwrap_or(false)
        })
        .map(|(day, block)| Position {
            week: TRACKED_WEEK,
            day,
            block,
        })
}

/// Project content cut to `max_chars` characters.
pub fn project_preview(project: &Project, max_chars: usize) -> String {
    truncate_chars(&project.content, max_chars)
}

/// All derived numbers for a snapshot.
pub fn aggregate_stats(snapshot: &Snapshot) -> AggregateStats {
    AggregateStats {
        total_blocks: TOTAL_BLOCKS,
        completed_count: completed_count(snapshot),
        completion_rate: completion_rate(snapshot),
        position: snapshot.position,
        next_incomplete: next_incomplete(snapshot),
        glossary_mastery: glossary_mastery(snapshot),
        by_day: completion_breakdown(snapshot),
        recall: recall_averages(snapshot),
        recall_attempts: snapshot.recall_attempts.len(),
        projects: snapshot.projects.len(),
        prompts: snapshot.prompt_library.len(),
        glossary_terms_reviewed: snapshot.glossary.len(),
    }
}

/// Aggregates plus recent recalls and project previews, sized by `config`.
pub fn progress_report(snapshot: &Snapshot, config: &Config) -> ProgressReport {
    ProgressReport {
        stats: aggregate_stats(snapshot),
        recent_recalls: recent_recalls(snapshot, config.recall.recent_limit)
            .into_iter()
            .cloned()
            .collect(),
        projects: snapshot
            .projects
            .iter()
            .map(|p| ProjectSummary {
                name: p.name.clone(),
                day: p.day,
                timestamp: p.timestamp,
                preview: project_preview(p, config.projects.preview_chars),
            })
            .collect(),
    }
}
