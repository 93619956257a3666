//! Key-value storage trait for the tracker.
//!
//! This module defines the `KeyValueStore` trait the progress store persists
//! through, and the fixed set of keys it writes.

use std::sync::Arc;

use crate::error::Result;

/// Key holding the completion map.
pub const COMPLETIONS_KEY: &str = "completedBlocks";
/// Key holding the recall attempt sequence.
pub const RECALL_ATTEMPTS_KEY: &str = "recallAttempts";
/// Key holding the glossary progress map.
pub const GLOSSARY_KEY: &str = "glossaryProgress";
/// Key holding the project sequence.
pub const PROJECTS_KEY: &str = "projects";
/// Key holding the prompt library sequence.
pub const PROMPT_LIBRARY_KEY: &str = "promptLibrary";
/// Scalar key for the current week.
pub const WEEK_KEY: &str = "currentWeek";
/// Scalar key for the current day.
pub const DAY_KEY: &str = "currentDay";
/// Scalar key for the current block.
pub const BLOCK_KEY: &str = "currentBlock";

/// Every key the progress store owns.
pub const ALL_KEYS: &[&str] = &[
    COMPLETIONS_KEY,
    RECALL_ATTEMPTS_KEY,
    GLOSSARY_KEY,
    PROJECTS_KEY,
    PROMPT_LIBRARY_KEY,
    WEEK_KEY,
    DAY_KEY,
    BLOCK_KEY,
];

/// Trait for string key-value persistence backends.
///
/// Implementations are synchronous: a call returns only after the value is
/// durably stored, or with an error if it was not.
pub trait KeyValueStore: Send + Sync {
    /// Read a value.
    ///
    /// Returns `Ok(None)` if the key has never been set.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a value.
    ///
    /// Returns `Ok(())` even if the key doesn't exist.
    fn remove(&self, key: &str) -> Result<()>;

    /// Remove every value.
    fn clear(&self) -> Result<()>;

    /// Check if a key has a value.
    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }
}

/// Blanket implementation for Arc-wrapped stores.
///
/// Lets tests keep a handle on the backend a `ProgressStore` writes to.
impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }

    fn clear(&self) -> Result<()> {
        (**self).clear()
    }
}

/// Blanket implementation for boxed stores, as returned by `open_backend`.
impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }

    fn clear(&self) -> Result<()> {
        (**self).clear()
    }
}
