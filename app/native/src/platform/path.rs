//! Path helpers for configuration values.
//!
//! Configuration paths may start with `~` and may be relative to the
//! configuration file's directory.

use std::path::{Path, PathBuf};

/// Expands a leading `~` to the user's home directory.
///
/// Absolute and relative paths are returned unchanged; an empty or
/// whitespace-only string yields an empty path.
#[must_use]
pub fn expand(path: &str) -> PathBuf {
    let path = path.trim();

    if path.is_empty() {
        return PathBuf::new();
    }

    let expanded = shellexpand::tilde(path);
    PathBuf::from(expanded.as_ref())
}

/// Expands `~` and resolves relative paths against `base_dir`.
///
/// Used for `watchDirectory` and `cacheDirectory`, which are interpreted
/// relative to the directory holding the configuration file.
#[must_use]
pub fn expand_and_resolve(path: &str, base_dir: &Path) -> PathBuf {
    let expanded = expand(path);

    if expanded.as_os_str().is_empty() || expanded.is_absolute() {
        return expanded;
    }

    base_dir.join(expanded)
}

/// Builds the `file://` URI handed to desktop settings.
#[must_use]
pub fn file_uri(path: &Path) -> String { format!("file://{}", path.display()) }
