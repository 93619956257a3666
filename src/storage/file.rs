//! File-based key-value storage.
//!
//! Each key is stored as `<data_dir>/<key>.json`.
//! Atomic writes are achieved via temp file + rename pattern.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{BootcampError, Result};
use crate::storage::KeyValueStore;
use crate::util::{read_to_string_limited, MAX_FILE_SIZE};

/// File-based key-value store.
///
/// Stores one file per key in a configurable directory.
#[derive(Debug, Clone)]
pub struct FileKvStore {
    /// Directory where value files are stored.
    data_dir: PathBuf,
}

impl FileKvStore {
    /// Create a new file store rooted at `data_dir`, creating it if needed.
    pub fn with_dir(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();

        if !data_dir.exists() {
            fs::create_dir_all(&data_dir).map_err(|e| BootcampError::storage(&data_dir, e))?;
        }

        Ok(Self { data_dir })
    }

    /// The directory values are stored in.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Keys become file names, so only a safe character set is allowed.
    fn check_key(key: &str) -> Result<()> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if valid {
            Ok(())
        } else {
            Err(BootcampError::persistence(
                key,
                "keys may only contain ASCII letters, digits, '-' and '_'",
            ))
        }
    }

    /// Get the path for a value file.
    fn value_path(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", key))
    }

    /// Get the path for a temp file used during atomic writes.
    fn temp_path(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!(".{}.json.tmp", key))
    }

    /// Write a value atomically using temp file + rename.
    fn atomic_write(&self, key: &str, value: &str) -> Result<()> {
        let final_path = self.value_path(key);
        let temp_path = self.temp_path(key);

        {
            let mut file =
                fs::File::create(&temp_path).map_err(|e| BootcampError::storage(&temp_path, e))?;
            file.write_all(value.as_bytes())
                .map_err(|e| BootcampError::storage(&temp_path, e))?;
            file.sync_all()
                .map_err(|e| BootcampError::storage(&temp_path, e))?;
        }

        // Rename temp file to final path (atomic on POSIX)
        fs::rename(&temp_path, &final_path).map_err(|e| BootcampError::storage(&final_path, e))?;

        Ok(())
    }
}

impl KeyValueStore for FileKvStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Self::check_key(key)?;
        let path = self.value_path(key);

        if !path.exists() {
            return Ok(None);
        }

        read_to_string_limited(&path).map(Some)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        Self::check_key(key)?;
        // Anything `get` would refuse to read back must not be written
        let size = value.len() as u64;
        if size > MAX_FILE_SIZE {
            return Err(BootcampError::persistence(
                key,
                format!("value too large ({} bytes, max {} bytes)", size, MAX_FILE_SIZE),
            ));
        }
        self.atomic_write(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        Self::check_key(key)?;
        let path = self.value_path(key);

        if path.exists() {
            fs::remove_file(&path).map_err(|e| BootcampError::storage(&path, e))?;
        }

        // Also clean up any temp file
        let temp_path = self.temp_path(key);
        if temp_path.exists() {
            let _ = fs::remove_file(&temp_path);
        }

        Ok(())
    }

    fn clear(&self) -> Result<()> {
        if !self.data_dir.exists() {
            return Ok(());
        }

        let entries =
            fs::read_dir(&self.data_dir).map_err(|e| BootcampError::storage(&self.data_dir, e))?;

        for entry in entries {
            let entry = entry.map_err(|e| BootcampError::storage(&self.data_dir, e))?;
            let path = entry.path();

            let name = entry.file_name().to_string_lossy().into_owned();
            let is_value = name.ends_with(".json") && !name.starts_with('.');
            let is_temp = name.starts_with('.') && name.ends_with(".json.tmp");
            if (is_value || is_temp) && path.is_file() {
                fs::remove_file(&path).map_err(|e| BootcampError::storage(&path, e))?;
            }
        }

        Ok(())
    }
}
