//! Bootcamp - progress tracking for a structured learning curriculum
//!
//! The tracker records block completion, active-recall attempts, glossary
//! mastery, saved projects and a prompt library, persists them through a
//! pluggable key-value backend, and derives progress statistics on demand.

pub mod config;
pub mod core;
pub mod error;
pub mod stats;
pub mod storage;
pub mod util;

pub use config::Config;
pub use core::{
    BlockKey, CompletionRecord, Confirmation, GlossaryProgress, Position, ProgressStore, Project,
    PromptLibraryEntry, RecallAttempt, Rating, Snapshot,
};
pub use error::{BootcampError, FailOpen, Result};
pub use stats::{aggregate_stats, progress_report, AggregateStats, ProgressReport};
pub use storage::{open_backend, FileKvStore, KeyValueStore, MemoryKvStore};
