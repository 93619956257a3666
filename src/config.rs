//! Configuration loading for the tracker.
//!
//! Configuration follows a precedence chain:
//! 1. Environment variables (highest priority)
//! 2. User config (`~/.bootcamp/config.toml`)
//! 3. Defaults (lowest priority)
//!
//! All configuration is optional. The tracker runs with sensible defaults
//! when no config exists.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{BootcampError, FailOpen, Result};

/// Main configuration struct.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Persistence backend configuration.
    pub storage: StorageConfig,
    /// Recall drill configuration.
    pub recall: RecallConfig,
    /// Project listing configuration.
    pub projects: ProjectsConfig,
}

/// Valid values for the storage backend field.
pub const VALID_BACKENDS: &[&str] = &["file", "memory"];

/// Persistence backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Backend kind: "file" or "memory".
    pub backend: String,
    /// Directory for the file backend. Defaults to `<home>/data`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl StorageConfig {
    /// Check if a backend value is valid.
    pub fn is_valid_backend(value: &str) -> bool {
        VALID_BACKENDS.contains(&value)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: "file".to_string(),
            data_dir: None,
        }
    }
}

/// Recall drill configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RecallConfig {
    /// How many recent attempts to list, newest first.
    pub recent_limit: usize,
}

impl Default for RecallConfig {
    fn default() -> Self {
        Self { recent_limit: 5 }
    }
}

/// Project listing configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProjectsConfig {
    /// Characters of project content shown in previews.
    pub preview_chars: usize,
}

impl Default for ProjectsConfig {
    fn default() -> Self {
        Self { preview_chars: 150 }
    }
}

impl Config {
    /// Load configuration with full precedence chain.
    pub fn load() -> Self {
        let mut config = Config::default();

        if let Some(user_config) = Self::load_user_config() {
            config = config.merge(user_config);
        }

        config.apply_env_overrides();
        config
    }

    /// Load user config from `<home>/config.toml`.
    ///
    /// A missing file is normal. An unreadable one is logged and ignored.
    fn load_user_config() -> Option<Config> {
        let config_path = bootcamp_home()?.join("config.toml");
        if !config_path.exists() {
            return None;
        }
        Self::load_from_file(&config_path)
            .map(Some)
            .fail_open_default("loading user config")
    }

    /// Load config from a specific file path.
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path).map_err(|e| BootcampError::storage(path, e))?;
        let config: Config =
            toml::from_str(&content).map_err(|e| BootcampError::config(e.to_string()))?;
        if !StorageConfig::is_valid_backend(&config.storage.backend) {
            return Err(BootcampError::config(format!(
                "unknown storage backend '{}', expected one of {:?}",
                config.storage.backend, VALID_BACKENDS
            )));
        }
        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        // BOOTCAMP_STORAGE_BACKEND
        if let Ok(val) = env::var("BOOTCAMP_STORAGE_BACKEND") {
            if StorageConfig::is_valid_backend(&val) {
                self.storage.backend = val;
            } else {
                tracing::warn!(
                    "Invalid BOOTCAMP_STORAGE_BACKEND value '{}'. Valid values: {:?}. Using '{}'.",
                    val,
                    VALID_BACKENDS,
                    self.storage.backend
                );
            }
        }

        // BOOTCAMP_DATA_DIR
        if let Ok(val) = env::var("BOOTCAMP_DATA_DIR") {
            if val.is_empty() {
                tracing::warn!("BOOTCAMP_DATA_DIR is empty, ignoring");
            } else {
                self.storage.data_dir = Some(PathBuf::from(val));
            }
        }

        // BOOTCAMP_RECENT_LIMIT
        if let Ok(val) = env::var("BOOTCAMP_RECENT_LIMIT") {
            match val.parse::<usize>() {
                Ok(n) => self.recall.recent_limit = n,
                Err(_) => tracing::warn!(
                    "Invalid BOOTCAMP_RECENT_LIMIT value '{}'. Expected a non-negative integer. Using '{}'.",
                    val,
                    self.recall.recent_limit
                ),
            }
        }

        // BOOTCAMP_PREVIEW_CHARS
        if let Ok(val) = env::var("BOOTCAMP_PREVIEW_CHARS") {
            match val.parse::<usize>() {
                Ok(n) => self.projects.preview_chars = n,
                Err(_) => tracing::warn!(
                    "Invalid BOOTCAMP_PREVIEW_CHARS value '{}'. Expected a non-negative integer. Using '{}'.",
                    val,
                    self.projects.preview_chars
                ),
            }
        }
    }

    /// Merge another config into this one.
    ///
    /// Field by field: every non-default value in `other` wins. A layer
    /// cannot set a field back to its default over a lower layer's value.
    fn merge(mut self, other: Config) -> Self {
        let default_storage = StorageConfig::default();
        if other.storage.backend != default_storage.backend {
            self.storage.backend = other.storage.backend;
        }
        if other.storage.data_dir.is_some() {
            self.storage.data_dir = other.storage.data_dir;
        }

        if other.recall.recent_limit != RecallConfig::default().recent_limit {
            self.recall.recent_limit = other.recall.recent_limit;
        }

        if other.projects.preview_chars != ProjectsConfig::default().preview_chars {
            self.projects.preview_chars = other.projects.preview_chars;
        }

        self
    }

    /// Directory the file backend writes to.
    pub fn data_dir(&self) -> Option<PathBuf> {
        self.storage
            .data_dir
            .clone()
            .or_else(|| bootcamp_home().map(|h| h.join("data")))
    }
}

/// Get the tracker home directory.
///
/// Checks `BOOTCAMP_HOME` first, then falls back to `~/.bootcamp`. An empty
/// `BOOTCAMP_HOME` is ignored.
pub fn bootcamp_home() -> Option<PathBuf> {
    if let Ok(home) = env::var("BOOTCAMP_HOME") {
        if home.is_empty() {
            tracing::warn!("BOOTCAMP_HOME is empty, using default");
        } else {
            let path = PathBuf::from(&home);
            if path.is_absolute() {
                return Some(path);
            }
            if let Ok(canonical) = path.canonicalize() {
                return Some(canonical);
            }
            tracing::warn!("BOOTCAMP_HOME is relative and doesn't exist, using as-is");
            return Some(path);
        }
    }

    if let Some(home) = dirs::home_dir() {
        return Some(home.join(".bootcamp"));
    }

    // Containerized/minimal environments without HOME
    let fallback_path = env::temp_dir().join("bootcamp");
    tracing::warn!(
        "HOME not set, using fallback location: {}",
        fallback_path.display()
    );
    Some(fallback_path)
}
