//! Cache directory utilities.
//!
//! Provides a centralized way to get the application's cache directory.
//! Uses `$XDG_CACHE_HOME/{APP_ID}/` (usually `~/.cache/{APP_ID}`) so fitted
//! wallpapers survive reboots, with a fallback to `/tmp/{APP_ID}/` if the cache
//! directory is unavailable.

use std::path::{Path, PathBuf};

use crate::constants::APP_ID;

/// Returns the root cache directory for the application.
#[must_use]
pub fn get_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .map_or_else(|| PathBuf::from(format!("/tmp/{APP_ID}")), |cache| cache.join(APP_ID))
}

/// Returns a cache subdirectory for the given component.
///
/// # Arguments
///
/// * `subdir` - The subdirectory name within the app's cache directory (e.g., `fitted`)
#[must_use]
pub fn get_cache_subdir(subdir: &str) -> PathBuf { get_cache_dir().join(subdir) }

/// Clears a cache directory.
///
/// Removes the directory and everything below it.
///
/// # Returns
///
/// * `Ok(bytes_freed)` - The approximate number of bytes freed
/// * `Err(error)` - If the operation failed
///
/// # Errors
///
/// Returns an error on permission or I/O failures while removing files.
/// A missing directory is not an error and yields `Ok(0)`.
pub fn clear_dir(dir: &Path) -> std::io::Result<u64> {
    if !dir.exists() {
        return Ok(0);
    }

    let bytes_freed = calculate_dir_size(dir)?;
    std::fs::remove_dir_all(dir)?;

    Ok(bytes_freed)
}

/// Calculates the total size of a directory in bytes.
fn calculate_dir_size(path: &Path) -> std::io::Result<u64> {
    let mut total = 0u64;

    if path.is_dir() {
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() {
                total += calculate_dir_size(&path)?;
            } else {
                total += entry.metadata().map(|m| m.len()).unwrap_or(0);
            }
        }
    }

    Ok(total)
}

/// Formats a byte count as a human-readable string.
#[must_use]
#[allow(clippy::cast_precision_loss)] // Precision loss is acceptable for human-readable output
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} bytes")
    }
}
