//! Learner history records.
//!
//! Field names serialize in camelCase so persisted values keep the layout
//! of the browser tracker's local storage.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::position::{deserialize_day, BlockKey, Position, Rating};

/// Completion state of one block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
    /// Always true once written.
    pub completed: bool,
    /// When the block was (last) marked complete.
    pub timestamp: DateTime<Utc>,
}

impl CompletionRecord {
    /// A completed record stamped now.
    pub fn now() -> Self {
        Self {
            completed: true,
            timestamp: Utc::now(),
        }
    }
}

/// One spaced-recall quiz attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecallAttempt {
    /// The glossary concept being recalled.
    pub concept: String,
    /// What the learner wrote from memory.
    pub your_answer: String,
    /// The reference answer shown afterwards.
    pub correct_answer: String,
    /// How sure the learner was before checking.
    pub confidence: Rating,
    /// Self-assessed accuracy after checking.
    pub score: Rating,
    /// When the attempt was recorded.
    pub timestamp: DateTime<Utc>,
    /// Curriculum day the learner was on.
    #[serde(deserialize_with = "deserialize_day")]
    pub day: u8,
}

/// Self-rated mastery of one glossary term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlossaryProgress {
    /// Most recent rating.
    pub mastery: Rating,
    /// When the term was last rated.
    pub last_reviewed: DateTime<Utc>,
    /// Number of ratings ever applied.
    pub review_count: u32,
}

impl GlossaryProgress {
    /// Apply a new rating on top of an optional previous one.
    pub fn rated(previous: Option<&GlossaryProgress>, mastery: Rating) -> Self {
        Self {
            mastery,
            last_reviewed: Utc::now(),
            review_count: previous.map_or(0, |p| p.review_count).saturating_add(1),
        }
    }
}

/// A saved mini-project artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub content: String,
    #[serde(deserialize_with = "deserialize_day")]
    pub day: u8,
    pub timestamp: DateTime<Utc>,
}

/// A saved prompt template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptLibraryEntry {
    pub category: String,
    pub prompt: String,
    pub notes: String,
    pub timestamp: DateTime<Utc>,
}

/// Completion records keyed by block, in canonical order.
pub type Completions = BTreeMap<BlockKey, CompletionRecord>;

/// Glossary progress keyed by term.
pub type Glossary = HashMap<String, GlossaryProgress>;

/// Immutable view of all learner state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    pub position: Position,
    pub completions: Completions,
    pub recall_attempts: Vec<RecallAttempt>,
    pub glossary: Glossary,
    pub projects: Vec<Project>,
    pub prompt_library: Vec<PromptLibraryEntry>,
}

impl Snapshot {
    /// Whether the block is recorded as completed.
    pub fn is_complete(&self, key: &BlockKey) -> bool {
        self.completions.get(key).is_some_and(|r| r.completed)
    }
}
