//! Progress state machine.
//!
//! `ProgressStore` owns all learner state and is the only thing that writes
//! it. Every mutation stages its serialized keys, writes them, and only then
//! swaps the new state in. A failed write restores the keys already written
//! by that call, so memory and storage never disagree.

use std::str::FromStr;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::core::position::{validate_day, BlockKey, Position, Rating, TRACKED_WEEK};
use crate::core::records::{
    CompletionRecord, GlossaryProgress, Project, PromptLibraryEntry, RecallAttempt, Snapshot,
};
use crate::error::{BootcampError, Result};
use crate::storage::traits::{
    ALL_KEYS, BLOCK_KEY, COMPLETIONS_KEY, DAY_KEY, GLOSSARY_KEY, PROJECTS_KEY,
    PROMPT_LIBRARY_KEY, RECALL_ATTEMPTS_KEY, WEEK_KEY,
};
use crate::storage::KeyValueStore;

/// Prompts asked, in order, before a confirmed reset.
pub const RESET_PROMPTS: [&str; 2] = [
    "This will delete ALL your progress. Are you absolutely sure?",
    "Really sure? This cannot be undone!",
];

/// Capability to ask the learner a yes/no question.
///
/// Supplied by the presentation layer; the store never prompts on its own.
pub trait Confirmation {
    /// Return true if the learner accepted `prompt`.
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirmation for F {
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// One staged key change.
#[derive(Debug)]
enum Write {
    Set(String),
    Remove,
}

/// Key changes staged by a single mutation, applied in order.
#[derive(Debug, Default)]
struct WriteSet {
    writes: Vec<(&'static str, Write)>,
}

impl WriteSet {
    fn json<T: Serialize>(mut self, key: &'static str, value: &T) -> Result<Self> {
        let encoded = serde_json::to_string(value)?;
        self.writes.push((key, Write::Set(encoded)));
        Ok(self)
    }

    fn position(mut self, position: &Position) -> Self {
        self.writes
            .push((WEEK_KEY, Write::Set(position.week.to_string())));
        self.writes.push((DAY_KEY, Write::Set(position.day.to_string())));
        self.writes
            .push((BLOCK_KEY, Write::Set(position.block.to_string())));
        self
    }

    fn remove_all(keys: &[&'static str]) -> Self {
        Self {
            writes: keys.iter().map(|k| (*k, Write::Remove)).collect(),
        }
    }
}

/// Single source of truth for learner progress.
///
/// Generic over the persistence backend; construct one per learner (or per
/// test) and pass it where it is needed.
#[derive(Debug)]
pub struct ProgressStore<S: KeyValueStore> {
    store: S,
    state: Snapshot,
}

impl<S: KeyValueStore> ProgressStore<S> {
    /// Load all state from `store`.
    ///
    /// Missing keys start empty. Corrupted or out-of-range values are an
    /// error rather than being replaced with defaults.
    pub fn open(store: S) -> Result<Self> {
        let state = Snapshot {
            position: load_position(&store)?,
            completions: load_json(&store, COMPLETIONS_KEY)?,
            recall_attempts: load_json(&store, RECALL_ATTEMPTS_KEY)?,
            glossary: load_json(&store, GLOSSARY_KEY)?,
            projects: load_json(&store, PROJECTS_KEY)?,
            prompt_library: load_json(&store, PROMPT_LIBRARY_KEY)?,
        };

        tracing::debug!(
            "opened progress at {} with {} completed blocks",
            state.position,
            state.completions.len()
        );

        Ok(Self { store, state })
    }

    /// Immutable view of all current state.
    pub fn snapshot(&self) -> &Snapshot {
        &self.state
    }

    /// The current position pointer.
    pub fn position(&self) -> Position {
        self.state.position
    }

    /// The backend this store persists to.
    pub fn backend(&self) -> &S {
        &self.store
    }

    // =========================================================================
    // Completion and advancement
    // =========================================================================

    /// Mark a block complete and advance the position past it.
    ///
    /// Re-marking a block only refreshes its timestamp. The new position is
    /// computed from the given coordinates, not from the current position.
    pub fn mark_complete(&mut self, week: u32, day: u8, block: u8) -> Result<()> {
        let key = BlockKey::new(week, day, block)?;

        let mut completions = self.state.completions.clone();
        completions.insert(key, CompletionRecord::now());
        let position = Position::after(week, day, block);

        let writes = WriteSet::default()
            .json(COMPLETIONS_KEY, &completions)?
            .position(&position);
        self.commit(writes)?;

        self.state.completions = completions;
        self.state.position = position;
        tracing::debug!("completed {}, now at {}", key, position);
        Ok(())
    }

    /// Whether a block is complete. Unknown or invalid coordinates are false.
    pub fn is_complete(&self, week: u32, day: u8, block: u8) -> bool {
        BlockKey::new(week, day, block)
            .map(|key| self.state.is_complete(&key))
            .unwrap_or(false)
    }

    /// Save a project and complete the block that asked for it, atomically.
    ///
    /// Applies to the tracked week. Empty content is rejected.
    pub fn complete_project_block(
        &mut self,
        day: u8,
        block: u8,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<()> {
        let key = BlockKey::new(TRACKED_WEEK, day, block)?;
        let content = content.into();
        if content.trim().is_empty() {
            return Err(BootcampError::validation(
                "content",
                "project content must not be empty",
            ));
        }

        let mut projects = self.state.projects.clone();
        projects.push(Project {
            name: name.into(),
            content,
            day,
            timestamp: Utc::now(),
        });
        let mut completions = self.state.completions.clone();
        completions.insert(key, CompletionRecord::now());
        let position = Position::after(TRACKED_WEEK, day, block);

        let writes = WriteSet::default()
            .json(PROJECTS_KEY, &projects)?
            .json(COMPLETIONS_KEY, &completions)?
            .position(&position);
        self.commit(writes)?;

        self.state.projects = projects;
        self.state.completions = completions;
        self.state.position = position;
        tracing::debug!("saved project for {}, now at {}", key, position);
        Ok(())
    }

    // =========================================================================
    // Recall and glossary
    // =========================================================================

    /// Record a recall attempt, tagged with the current day.
    pub fn add_recall_attempt(
        &mut self,
        concept: impl Into<String>,
        your_answer: impl Into<String>,
        correct_answer: impl Into<String>,
        confidence: Rating,
        score: Rating,
    ) -> Result<()> {
        let attempt = self.new_attempt(
            concept.into(),
            your_answer.into(),
            correct_answer.into(),
            confidence,
            score,
        );

        let mut attempts = self.state.recall_attempts.clone();
        attempts.push(attempt);

        self.commit(WriteSet::default().json(RECALL_ATTEMPTS_KEY, &attempts)?)?;

        self.state.recall_attempts = attempts;
        tracing::debug!("recorded recall attempt #{}", self.state.recall_attempts.len());
        Ok(())
    }

    /// Rate a glossary term. The latest rating replaces the previous one.
    pub fn update_glossary_progress(
        &mut self,
        term: impl Into<String>,
        mastery: Rating,
    ) -> Result<()> {
        let term = term.into();
        let mut glossary = self.state.glossary.clone();
        let progress = GlossaryProgress::rated(glossary.get(&term), mastery);
        let review_count = progress.review_count;
        glossary.insert(term.clone(), progress);

        self.commit(WriteSet::default().json(GLOSSARY_KEY, &glossary)?)?;

        self.state.glossary = glossary;
        tracing::debug!("rated '{}' {} (review #{})", term, mastery, review_count);
        Ok(())
    }

    /// Finish a recall drill: record the attempt and apply the self-assessed
    /// score as the term's glossary rating, atomically.
    ///
    /// A blank answer is rejected.
    pub fn submit_recall(
        &mut self,
        concept: impl Into<String>,
        your_answer: impl Into<String>,
        correct_answer: impl Into<String>,
        confidence: Rating,
        score: Rating,
    ) -> Result<()> {
        let concept = concept.into();
        let your_answer = your_answer.into();
        if your_answer.trim().is_empty() {
            return Err(BootcampError::validation(
                "answer",
                "write an answer before checking",
            ));
        }

        let attempt = self.new_attempt(
            concept.clone(),
            your_answer.trim().to_string(),
            correct_answer.into(),
            confidence,
            score,
        );
        let mut attempts = self.state.recall_attempts.clone();
        attempts.push(attempt);
        let mut glossary = self.state.glossary.clone();
        let progress = GlossaryProgress::rated(glossary.get(&concept), score);
        glossary.insert(concept.clone(), progress);

        let writes = WriteSet::default()
            .json(RECALL_ATTEMPTS_KEY, &attempts)?
            .json(GLOSSARY_KEY, &glossary)?;
        self.commit(writes)?;

        self.state.recall_attempts = attempts;
        self.state.glossary = glossary;
        tracing::debug!(
            "recall drill on '{}': confidence {}, score {}",
            concept,
            confidence,
            score
        );
        Ok(())
    }

    fn new_attempt(
        &self,
        concept: String,
        your_answer: String,
        correct_answer: String,
        confidence: Rating,
        score: Rating,
    ) -> RecallAttempt {
        RecallAttempt {
            concept,
            your_answer,
            correct_answer,
            confidence,
            score,
            timestamp: Utc::now(),
            day: self.state.position.day,
        }
    }

    // =========================================================================
    // Projects and prompts
    // =========================================================================

    /// Append a project artifact.
    pub fn add_project(
        &mut self,
        name: impl Into<String>,
        content: impl Into<String>,
        day: u8,
    ) -> Result<()> {
        let day = validate_day(day)?;
        let mut projects = self.state.projects.clone();
        projects.push(Project {
            name: name.into(),
            content: content.into(),
            day,
            timestamp: Utc::now(),
        });

        self.commit(WriteSet::default().json(PROJECTS_KEY, &projects)?)?;

        self.state.projects = projects;
        tracing::debug!("saved project #{}", self.state.projects.len());
        Ok(())
    }

    /// Append a prompt to the library.
    pub fn add_prompt(
        &mut self,
        category: impl Into<String>,
        prompt: impl Into<String>,
        notes: impl Into<String>,
    ) -> Result<()> {
        let mut library = self.state.prompt_library.clone();
        library.push(PromptLibraryEntry {
            category: category.into(),
            prompt: prompt.into(),
            notes: notes.into(),
            timestamp: Utc::now(),
        });

        self.commit(WriteSet::default().json(PROMPT_LIBRARY_KEY, &library)?)?;

        self.state.prompt_library = library;
        tracing::debug!("saved prompt #{}", self.state.prompt_library.len());
        Ok(())
    }

    // =========================================================================
    // Reset
    // =========================================================================

    /// Delete all progress and return to Week 1, Day 1, Block 1.
    ///
    /// Unconditional; see [`ProgressStore::reset_confirmed`] for the guarded
    /// variant.
    pub fn reset(&mut self) -> Result<()> {
        self.commit(WriteSet::remove_all(ALL_KEYS))?;
        self.state = Snapshot::default();
        tracing::info!("progress reset");
        Ok(())
    }

    /// Reset only if the learner accepts both [`RESET_PROMPTS`] in turn.
    ///
    /// Returns whether the reset happened.
    pub fn reset_confirmed<C>(&mut self, confirmation: &mut C) -> Result<bool>
    where
        C: Confirmation + ?Sized,
    {
        for prompt in RESET_PROMPTS {
            if !confirmation.confirm(prompt) {
                tracing::debug!("reset declined");
                return Ok(false);
            }
        }
        self.reset()?;
        Ok(true)
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Apply staged writes in order, undoing applied ones if any fails.
    fn commit(&self, staged: WriteSet) -> Result<()> {
        let mut applied: Vec<(&'static str, Option<String>)> = Vec::new();

        for (key, write) in staged.writes {
            let result = self.store.get(key).and_then(|previous| {
                match &write {
                    Write::Set(value) => self.store.set(key, value)?,
                    Write::Remove => self.store.remove(key)?,
                }
                Ok(previous)
            });

            match result {
                Ok(previous) => applied.push((key, previous)),
                Err(err) => {
                    tracing::warn!("write to '{}' failed, rolling back: {}", key, err);
                    self.roll_back(applied);
                    return Err(err);
                }
            }
        }

        Ok(())
    }

    fn roll_back(&self, applied: Vec<(&'static str, Option<String>)>) {
        for (key, previous) in applied.into_iter().rev() {
            let restored = match previous {
                Some(value) => self.store.set(key, &value),
                None => self.store.remove(key),
            };
            if let Err(err) = restored {
                tracing::warn!("could not restore '{}' after failed write: {}", key, err);
            }
        }
    }
}

fn load_json<S, T>(store: &S, key: &str) -> Result<T>
where
    S: KeyValueStore,
    T: DeserializeOwned + Default,
{
    match store.get(key)? {
        None => Ok(T::default()),
        Some(raw) => serde_json::from_str(&raw)
            .map_err(|e| BootcampError::persistence(key, format!("corrupted value: {}", e))),
    }
}

fn load_scalar<S, T>(store: &S, key: &str, default: T) -> Result<T>
where
    S: KeyValueStore,
    T: FromStr,
{
    match store.get(key)? {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| {
            BootcampError::persistence(key, format!("corrupted value: '{}' is not a number", raw))
        }),
    }
}

fn load_position<S: KeyValueStore>(store: &S) -> Result<Position> {
    let default = Position::default();
    let week = load_scalar(store, WEEK_KEY, default.week)?;
    let day = load_scalar(store, DAY_KEY, default.day)?;
    let block = load_scalar(store, BLOCK_KEY, default.block)?;

    Position::new(week, day, block).map_err(|e| {
        BootcampError::persistence("currentWeek/currentDay/currentBlock", e.to_string())
    })
}
