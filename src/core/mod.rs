//! Core types and logic for the tracker.
//!
//! This module contains the curriculum position model, the persisted record
//! types, and the progress store that owns all learner state.

pub mod position;
pub mod progress;
pub mod records;

pub use position::{
    BlockKey, Position, Rating, BLOCKS_PER_DAY, DAYS_PER_WEEK, MAX_RATING, MIN_RATING,
    TOTAL_BLOCKS, TRACKED_WEEK,
};
pub use progress::{Confirmation, ProgressStore, RESET_PROMPTS};
pub use records::{
    Completions, CompletionRecord, Glossary, GlossaryProgress, Project, PromptLibraryEntry,
    RecallAttempt, Snapshot,
};
