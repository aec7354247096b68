//! Configuration template generation.
//!
//! Generates a commented configuration template with all available options.

use std::fs;
use std::path::Path;

/// Generates a configuration template with all options commented out.
///
/// This creates a JSONC file documenting every option with its default
/// value. Parsing the template yields the default configuration.
#[must_use]
pub fn generate_config_template() -> String {
    r#"// Wallpaper Agent Configuration File
// ==================================
// This file uses JSONC format (JSON with comments).
// All options below are commented out and show their default values.
// Uncomment and modify the options you want to configure.
// Changes are picked up automatically while the agent is running.
{
  // Directory containing the wallpaper images.
  // "~" expands to your home directory; relative paths are resolved
  // against the directory of this file.
  // "watchDirectory": "~/Pictures/wallpapers",

  // File extensions (case-insensitive) treated as wallpapers.
  // "supportedExtensions": ["jpg", "jpeg", "png", "bmp"],

  // The delay between changes is picked uniformly between these bounds.
  // "minIntervalSeconds": 60,
  // "maxIntervalSeconds": 300,

  // Show a desktop notification with the image name after each change.
  // "notificationsEnabled": true,

  // Orientation filter: "landscape", "portrait" or "any".
  // "primaryOrientation": "landscape",

  // "lockAware": change the wallpaper while unlocked and refresh the lock
  //              screen once after each lock/unlock cycle.
  // "alternating": alternate between wallpaper and lock screen.
  // "gateVariant": "lockAware",

  // "incremental": merge new files into the catalog on each refresh.
  // "fullRescan": rebuild the catalog from scratch every time.
  // "catalogStyle": "incremental",

  // Recency bias: "nestedBands", "disjointBands" or "uniform".
  // "selectionPolicy": "nestedBands",

  // Resize images to cover the largest display before applying them.
  // "fitToDisplay": true,

  // Resize the whole catalog at startup.
  // "prewarmCache": true,

  // Where fitted images are stored. Empty uses ~/.cache/wallpaper-agent/fitted.
  // "cacheDirectory": "",

  // Desktop settings keys written with gsettings.
  // "desktop": {
  //   "background": { "schema": "org.gnome.desktop.background", "key": "picture-uri" },
  //   "screensaver": { "schema": "org.gnome.desktop.screensaver", "key": "picture-uri" },
  //   "darkVariant": true
  // },

  // Session-bus service queried for the lock state.
  // "lockScreen": {
  //   "busName": "org.gnome.ScreenSaver",
  //   "objectPath": "/org/gnome/ScreenSaver"
  // }
}
"#
    .to_string()
}

/// Creates a configuration file with the template at the specified path.
///
/// Creates parent directories if they don't exist.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn create_config_file(path: &Path) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, generate_config_template())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AgentConfig;

    #[test]
    fn test_generate_config_template_is_valid_jsonc() {
        let template = generate_config_template();
        let reader = json_comments::StripComments::new(template.as_bytes());
        let config: AgentConfig = serde_json::from_reader(reader).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.min_interval_seconds, AgentConfig::default().min_interval_seconds);
    }

    #[test]
    fn test_generate_config_template_documents_every_option() {
        let template = generate_config_template();
        for key in [
            "watchDirectory",
            "supportedExtensions",
            "minIntervalSeconds",
            "maxIntervalSeconds",
            "notificationsEnabled",
            "primaryOrientation",
            "gateVariant",
            "catalogStyle",
            "selectionPolicy",
            "fitToDisplay",
            "prewarmCache",
            "cacheDirectory",
            "desktop",
            "lockScreen",
        ] {
            assert!(template.contains(key), "template is missing {key}");
        }
    }

    #[test]
    fn test_create_config_file_creates_parents() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.jsonc");
        create_config_file(&path).unwrap();
        assert!(path.exists());
    }
}
