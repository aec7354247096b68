//! Connected display detection through the kernel DRM sysfs tree.

use std::fs;
use std::path::{Path, PathBuf};

use crate::wallpaper::{DisplaySource, ScreenSize};

const DRM_ROOT: &str = "/sys/class/drm";

/// Reads connector state from `/sys/class/drm`.
#[derive(Debug, Clone)]
pub struct DrmDisplays {
    root: PathBuf,
}

impl Default for DrmDisplays {
    fn default() -> Self { Self::new(DRM_ROOT) }
}

impl DrmDisplays {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }
}

impl DisplaySource for DrmDisplays {
    fn list_displays(&self) -> Vec<ScreenSize> {
        let Ok(entries) = fs::read_dir(&self.root) else {
            tracing::debug!(root = %self.root.display(), "no DRM connectors available");
            return Vec::new();
        };

        let mut connectors: Vec<PathBuf> = entries.flatten().map(|entry| entry.path()).collect();
        connectors.sort();
        connectors.iter().filter_map(|path| connector_mode(path)).collect()
    }
}

/// Returns the preferred mode of a connected connector.
fn connector_mode(connector: &Path) -> Option<ScreenSize> {
    let status = fs::read_to_string(connector.join("status")).ok()?;
    if status.trim() != "connected" {
        return None;
    }

    // First listed mode is the preferred one
    let modes = fs::read_to_string(connector.join("modes")).ok()?;
    parse_mode(modes.lines().next()?)
}

/// Parses a mode line such as `2560x1440` or `1920x1080i`.
fn parse_mode(line: &str) -> Option<ScreenSize> {
    let (width, height) = line.trim().split_once('x')?;
    let height: String = height.chars().take_while(char::is_ascii_digit).collect();
    let width = width.parse().ok()?;
    let height = height.parse().ok()?;
    (width > 0 && height > 0).then(|| ScreenSize::new(width, height))
}
