//! Collaborator interfaces the rotation engine depends on.
//!
//! Every side effect the engine performs goes through one of these traits so
//! the scheduler can be driven with in-memory fakes in tests. Production
//! implementations live in [`crate::platform`], except [`FsDirectory`] which
//! is plain `std::fs`.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use thiserror::Error;

/// A regular file found in the watched directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
    /// File name relative to the watched directory.
    pub name: String,
    /// Absolute path to the file.
    pub path: PathBuf,
    /// Last modification time.
    pub modified: SystemTime,
}

/// Pixel dimensions of a display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

impl ScreenSize {
    /// Creates a new screen size.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self { Self { width, height } }

    /// Returns a default screen size (2K) if detection fails.
    #[must_use]
    pub const fn default_2k() -> Self { Self { width: 2560, height: 1440 } }

    /// Returns the pixel area.
    #[must_use]
    pub const fn area(self) -> u64 { self.width as u64 * self.height as u64 }
}

impl fmt::Display for ScreenSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Which desktop picture a setting write targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingScope {
    /// The desktop background.
    Background,
    /// The lock screen.
    Screensaver,
}

impl fmt::Display for SettingScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Background => write!(f, "background"),
            Self::Screensaver => write!(f, "screensaver"),
        }
    }
}

/// Opaque handle of a shown notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NotificationId(pub u32);

/// Errors reported by a [`SettingSink`].
#[derive(Debug, Error)]
pub enum SettingError {
    /// The desktop does not expose the requested setting.
    #[error("setting scope '{0}' is not supported by this desktop")]
    UnsupportedScope(SettingScope),
    /// The settings tool ran but reported a failure.
    #[error("failed to write {scope} picture: {message}")]
    WriteFailed { scope: SettingScope, message: String },
    /// The settings tool could not be launched.
    #[error("failed to run settings tool: {0}")]
    Io(#[from] io::Error),
}

/// Errors reported by a [`NotificationSink`].
#[derive(Debug, Error)]
pub enum NotifyError {
    /// No notification server is reachable.
    #[error("notification server unavailable: {0}")]
    Unavailable(String),
    /// A single notification could not be shown.
    #[error("failed to show notification: {0}")]
    Show(String),
}

/// Errors reported by a [`LockSource`].
#[derive(Debug, Error)]
pub enum LockError {
    /// The session bus or the screensaver service could not be reached.
    #[error("failed to connect to {service}: {message}")]
    Connection { service: String, message: String },
    /// The lock state query failed.
    #[error("lock state query failed: {0}")]
    Query(String),
}

/// Lists and probes the files in the watched directory.
pub trait DirectorySource {
    /// Lists regular files directly inside `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read.
    fn list_entries(&self, dir: &Path) -> io::Result<Vec<DirEntryInfo>>;

    /// Reads the pixel dimensions of an image.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is not a decodable image.
    fn dimensions(&self, path: &Path) -> Result<(u32, u32), image::ImageError>;

    /// Returns whether the file still exists.
    fn exists(&self, path: &Path) -> bool;
}

/// Reports the connected displays.
pub trait DisplaySource {
    /// Returns the resolution of each connected display. May be empty.
    fn list_displays(&self) -> Vec<ScreenSize>;
}

/// Writes picture URIs into the desktop settings.
pub trait SettingSink {
    /// Points `scope` at `uri`.
    ///
    /// # Errors
    ///
    /// Returns a `SettingError` if the write failed or the scope is unsupported.
    fn set_picture_uri(&self, scope: SettingScope, uri: &str) -> Result<(), SettingError>;
}

/// Shows and closes desktop notifications.
pub trait NotificationSink {
    /// Shows a notification and returns its handle.
    ///
    /// # Errors
    ///
    /// Returns a `NotifyError` if the notification could not be shown.
    fn show(&mut self, title: &str, body: &str, icon: &str) -> Result<NotificationId, NotifyError>;

    /// Closes a previously shown notification. Unknown ids are ignored.
    fn close(&mut self, id: NotificationId);
}

/// Reports whether the session is locked.
pub trait LockSource {
    /// Polls the current lock state.
    ///
    /// # Errors
    ///
    /// Returns a `LockError` if the state could not be queried.
    fn is_locked(&self) -> Result<bool, LockError>;
}

/// [`DirectorySource`] backed by the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsDirectory;

impl DirectorySource for FsDirectory {
    fn list_entries(&self, dir: &Path) -> io::Result<Vec<DirEntryInfo>> {
        let mut entries = Vec::new();

        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();

            // Follow symlinks so linked images count as regular files
            let metadata = match fs::metadata(&path) {
                Ok(metadata) => metadata,
                Err(err) => {
                    tracing::debug!(error = %err, path = %path.display(), "skipping unreadable entry");
                    continue;
                }
            };

            if !metadata.is_file() {
                continue;
            }

            let Ok(modified) = metadata.modified() else {
                continue;
            };

            entries.push(DirEntryInfo {
                name: entry.file_name().to_string_lossy().into_owned(),
                path,
                modified,
            });
        }

        Ok(entries)
    }

    fn dimensions(&self, path: &Path) -> Result<(u32, u32), image::ImageError> {
        image::image_dimensions(path)
    }

    fn exists(&self, path: &Path) -> bool { path.is_file() }
}
