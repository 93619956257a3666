//! Utility functions for the tracker.

use std::fs;
use std::path::Path;

use crate::error::{BootcampError, Result};

/// Maximum size of a single stored value (10 MB).
///
/// Checked when a value is written and again when it is read back.
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Read a file into a string with size limit protection.
///
/// # Errors
///
/// Returns an error if:
/// * The file cannot be read (doesn't exist, permission denied, etc.)
/// * The file exceeds `MAX_FILE_SIZE`
pub fn read_to_string_limited(path: &Path) -> Result<String> {
    read_to_string_with_limit(path, MAX_FILE_SIZE)
}

/// Read a file into a string with a custom size limit.
pub fn read_to_string_with_limit(path: &Path, max_size: u64) -> Result<String> {
    let metadata = fs::metadata(path).map_err(|e| BootcampError::storage(path, e))?;

    let size = metadata.len();
    if size > max_size {
        return Err(BootcampError::persistence(
            path.display().to_string(),
            format!("value too large ({} bytes, max {} bytes)", size, max_size),
        ));
    }

    fs::read_to_string(path).map_err(|e| BootcampError::storage(path, e))
}

/// Truncate text to at most `max_chars` characters, appending `...` if cut.
///
/// Counts characters, not bytes, so multi-byte text is never split.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}
