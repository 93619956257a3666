//! Derived statistics for the tracker.
//!
//! All figures are computed on demand from a [`Snapshot`](crate::core::Snapshot);
//! nothing here is persisted.

pub mod engine;

pub use engine::{
    aggregate_stats, completed_count, completion_breakdown, completion_by_day, completion_rate,
    glossary_mastery, next_incomplete, progress_report, project_preview, recall_averages,
    recent_recalls, AggregateStats, DayCompletion, ProgressReport, ProjectSummary, RecallAverages,
};
