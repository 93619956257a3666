//! Key-value persistence for the tracker.
//!
//! This module provides the `KeyValueStore` trait and its file-based and
//! in-memory backends.

pub mod file;
pub mod memory;
pub mod traits;

pub use file::FileKvStore;
pub use memory::MemoryKvStore;
pub use traits::KeyValueStore;

use crate::config::Config;
use crate::error::{BootcampError, Result};

/// Build the backend selected by configuration.
pub fn open_backend(config: &Config) -> Result<Box<dyn KeyValueStore>> {
    match config.storage.backend.as_str() {
        "memory" => {
            tracing::debug!("using in-memory store");
            Ok(Box::new(MemoryKvStore::new()))
        }
        "file" => {
            let dir = config.data_dir().ok_or_else(|| {
                BootcampError::config("Could not determine data directory (no home directory)")
            })?;
            tracing::debug!("using file store at {}", dir.display());
            Ok(Box::new(FileKvStore::with_dir(dir)?))
        }
        other => Err(BootcampError::config(format!(
            "unknown storage backend '{}'",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_memory_backend() {
        let mut config = Config::default();
        config.storage.backend = "memory".to_string();

        let store = open_backend(&config).unwrap();
        store.set("currentDay", "2").unwrap();
        assert_eq!(store.get("currentDay").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_open_file_backend() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.storage.data_dir = Some(dir.path().join("data"));

        let store = open_backend(&config).unwrap();
        store.set("currentDay", "2").unwrap();
        assert!(dir.path().join("data").join("currentDay.json").exists());
    }

    #[test]
    fn test_open_unknown_backend() {
        let mut config = Config::default();
        config.storage.backend = "cloud".to_string();

        assert!(matches!(
            open_backend(&config),
            Err(BootcampError::Config { .. })
        ));
    }
}
