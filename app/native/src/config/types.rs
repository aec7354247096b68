//! Configuration types for the wallpaper agent.
//!
//! This module provides the configuration types and loading functionality.
//! The configuration file supports JSONC format (JSON with comments).
//! Both single-line (`//`) and multi-line (`/* */`) comments are allowed.

use std::fs;
use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cache::get_cache_subdir;
use crate::constants::APP_ID;
use crate::platform::path::{expand, expand_and_resolve};

/// Which image orientation the catalog accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum PrimaryOrientation {
    /// Accept images whose width is at least their height.
    #[default]
    Landscape,
    /// Accept images whose height is at least their width.
    Portrait,
    /// Accept every decodable image.
    Any,
}

impl PrimaryOrientation {
    /// Returns whether an image of the given pixel size passes the filter.
    ///
    /// Square images pass both `landscape` and `portrait`.
    #[must_use]
    pub const fn accepts(self, width: u32, height: u32) -> bool {
        match self {
            Self::Landscape => width >= height,
            Self::Portrait => height >= width,
            Self::Any => true,
        }
    }
}

/// How the agent decides which target to update on each tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum GateVariant {
    /// Alternate between wallpaper and lock screen, ignoring session state.
    Alternating,
    /// Update the wallpaper on unlocked ticks; refresh the lock screen once
    /// after each lock/unlock cycle.
    #[default]
    LockAware,
}

/// How the catalog is rebuilt on refresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum CatalogStyle {
    /// Merge newly modified files in front of the previous catalog.
    #[default]
    Incremental,
    /// Recompute the whole catalog on every refresh.
    FullRescan,
}

/// Recency-bias strategy used to pick the next image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum SelectionPolicyKind {
    /// Overlapping bands: newest 25%, 50%, 75%, then everything.
    #[default]
    NestedBands,
    /// Non-overlapping bands: newest half, next quarter, oldest quarter.
    DisjointBands,
    /// No recency bias.
    Uniform,
}

/// A single desktop settings key (`gsettings` schema + key).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SettingKey {
    /// Settings schema, e.g. `org.gnome.desktop.background`.
    pub schema: String,
    /// Key within the schema, e.g. `picture-uri`.
    pub key: String,
}

impl SettingKey {
    fn new(schema: &str, key: &str) -> Self {
        Self {
            schema: schema.to_string(),
            key: key.to_string(),
        }
    }
}

/// Where the wallpaper and lock-screen URIs are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct DesktopConfig {
    /// Settings key holding the desktop background URI.
    pub background: SettingKey,
    /// Settings key holding the lock-screen URI.
    pub screensaver: SettingKey,
    /// Also write `picture-uri-dark` next to the background key.
    pub dark_variant: bool,
}

impl Default for DesktopConfig {
    fn default() -> Self {
        Self {
            background: SettingKey::new("org.gnome.desktop.background", "picture-uri"),
            screensaver: SettingKey::new("org.gnome.desktop.screensaver", "picture-uri"),
            dark_variant: true,
        }
    }
}

/// Session-bus object queried for the lock state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct LockScreenConfig {
    /// Well-known bus name of the screensaver service.
    pub bus_name: String,
    /// Object path of the screensaver service.
    pub object_path: String,
}

impl Default for LockScreenConfig {
    fn default() -> Self {
        Self {
            bus_name: "org.gnome.ScreenSaver".to_string(),
            object_path: "/org/gnome/ScreenSaver".to_string(),
        }
    }
}

/// Root configuration for the wallpaper agent.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct AgentConfig {
    /// Directory containing candidate wallpaper images.
    /// Relative paths are resolved against the configuration file directory.
    pub watch_directory: String,

    /// File extensions (without the dot, case-insensitive) that are eligible.
    pub supported_extensions: Vec<String>,

    /// Lower bound of the randomized delay between ticks, in seconds.
    pub min_interval_seconds: u64,

    /// Upper bound of the randomized delay between ticks, in seconds.
    pub max_interval_seconds: u64,

    /// Show a desktop notification whenever an image is applied.
    pub notifications_enabled: bool,

    /// Orientation filter applied while scanning.
    pub primary_orientation: PrimaryOrientation,

    /// Wallpaper / lock-screen gating strategy.
    pub gate_variant: GateVariant,

    /// Catalog refresh strategy.
    pub catalog_style: CatalogStyle,

    /// Selection strategy.
    pub selection_policy: SelectionPolicyKind,

    /// Resize images to cover the largest connected display before applying them.
    pub fit_to_display: bool,

    /// Resize the whole catalog at startup instead of on first use.
    pub prewarm_cache: bool,

    /// Directory for fitted images. Empty means the default cache directory.
    pub cache_directory: String,

    /// Desktop settings keys.
    pub desktop: DesktopConfig,

    /// Lock-state source.
    pub lock_screen: LockScreenConfig,

    /// Directory of the file this configuration was loaded from.
    #[serde(skip)]
    #[schemars(skip)]
    pub base_dir: Option<PathBuf>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            watch_directory: "~/Pictures/wallpapers".to_string(),
            supported_extensions: ["jpg", "jpeg", "png", "bmp"].map(String::from).to_vec(),
            min_interval_seconds: 60,
            max_interval_seconds: 300,
            notifications_enabled: true,
            primary_orientation: PrimaryOrientation::default(),
            gate_variant: GateVariant::default(),
            catalog_style: CatalogStyle::default(),
            selection_policy: SelectionPolicyKind::default(),
            fit_to_display: true,
            prewarm_cache: true,
            cache_directory: String::new(),
            desktop: DesktopConfig::default(),
            lock_screen: LockScreenConfig::default(),
            base_dir: None,
        }
    }
}

impl AgentConfig {
    /// Checks the invariants the scheduler relies on.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` describing the first violated rule.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.watch_directory.trim().is_empty() {
            return Err(ConfigError::Invalid("watchDirectory must not be empty".into()));
        }
        if self.min_interval_seconds == 0 {
            return Err(ConfigError::Invalid("minIntervalSeconds must be at least 1".into()));
        }
        if self.min_interval_seconds > self.max_interval_seconds {
            return Err(ConfigError::Invalid(format!(
                "minIntervalSeconds ({}) is greater than maxIntervalSeconds ({})",
                self.min_interval_seconds, self.max_interval_seconds
            )));
        }
        if self.extensions().is_empty() {
            return Err(ConfigError::Invalid("supportedExtensions must not be empty".into()));
        }
        Ok(())
    }

    /// Returns the supported extensions lowercased and without leading dots.
    #[must_use]
    pub fn extensions(&self) -> Vec<String> {
        self.supported_extensions
            .iter()
            .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect()
    }

    /// Returns the resolved watch directory.
    #[must_use]
    pub fn watch_dir(&self) -> PathBuf { self.resolve(&self.watch_directory) }

    /// Returns the resolved fit-cache directory.
    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        if self.cache_directory.trim().is_empty() {
            get_cache_subdir("fitted")
        } else {
            self.resolve(&self.cache_directory)
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.base_dir
            .as_deref()
            .map_or_else(|| expand(path), |base| expand_and_resolve(path, base))
    }
}

/// Errors that can occur when loading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No configuration file was found in any of the expected locations.
    #[error("No configuration file found. Expected at ~/.config/{APP_ID}/config.jsonc")]
    NotFound,
    /// The configuration file exists but could not be read.
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),
    /// The configuration file contains invalid JSON.
    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] serde_json::Error),
    /// The configuration parsed but violates an invariant.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Configuration file names to search for (in priority order).
const CONFIG_FILE_NAMES: &[&str] = &["config.jsonc", "config.json"];

/// Legacy configuration file names in home directory.
const LEGACY_CONFIG_FILE_NAMES: &[&str] = &[".wallpaper-agent.jsonc", ".wallpaper-agent.json"];

/// Returns the possible configuration file paths in priority order.
///
/// 1. `$XDG_CONFIG_HOME/wallpaper-agent/config.jsonc` or `config.json`
/// 2. `~/.config/wallpaper-agent/config.jsonc` or `config.json`
/// 3. `~/.wallpaper-agent.jsonc` or `~/.wallpaper-agent.json`
#[must_use]
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME")
        && !xdg_config.is_empty()
    {
        let dir = PathBuf::from(xdg_config).join(APP_ID);
        for filename in CONFIG_FILE_NAMES {
            paths.push(dir.join(filename));
        }
    }

    if let Some(home) = dirs::home_dir() {
        let dir = home.join(".config").join(APP_ID);
        for filename in CONFIG_FILE_NAMES {
            let path = dir.join(filename);
            // XDG_CONFIG_HOME is frequently ~/.config already
            if !paths.contains(&path) {
                paths.push(path);
            }
        }

        for filename in LEGACY_CONFIG_FILE_NAMES {
            paths.push(home.join(filename));
        }
    }

    paths
}

/// Loads and validates the configuration from a specific file.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if the file does not exist, `IoError` if it
/// cannot be read, `ParseError` for invalid JSON and `Invalid` when
/// validation fails.
pub fn load_config_from_path(path: &Path) -> Result<(AgentConfig, PathBuf), ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound);
    }

    let file = fs::File::open(path)?;
    // Strip comments from JSONC before parsing
    let reader = json_comments::StripComments::new(file);
    let mut config: AgentConfig = serde_json::from_reader(reader)?;
    config.base_dir = path.parent().map(Path::to_path_buf);
    config.validate()?;

    Ok((config, path.to_path_buf()))
}

/// Loads the configuration from the first available config file.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if no configuration file exists in any of
/// the expected locations, or the errors of [`load_config_from_path`].
pub fn load_config() -> Result<(AgentConfig, PathBuf), ConfigError> {
    config_paths()
        .into_iter()
        .find(|path| path.exists())
        .map_or(Err(ConfigError::NotFound), |path| load_config_from_path(&path))
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AgentConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.gate_variant, GateVariant::LockAware);
        assert_eq!(config.catalog_style, CatalogStyle::Incremental);
        assert_eq!(config.selection_policy, SelectionPolicyKind::NestedBands);
        assert_eq!(config.primary_orientation, PrimaryOrientation::Landscape);
    }

    #[test]
    fn test_config_deserializes_jsonc_with_comments() {
        let json = r#"{
            // where the images live
            "watchDirectory": "/srv/walls",
            /* rotate fast */
            "minIntervalSeconds": 5,
            "maxIntervalSeconds": 10,
            "gateVariant": "alternating",
            "catalogStyle": "fullRescan",
            "selectionPolicy": "disjointBands",
            "primaryOrientation": "portrait"
        }"#;

        let reader = json_comments::StripComments::new(json.as_bytes());
        let config: AgentConfig = serde_json::from_reader(reader).unwrap();
        assert_eq!(config.watch_directory, "/srv/walls");
        assert_eq!(config.min_interval_seconds, 5);
        assert_eq!(config.max_interval_seconds, 10);
        assert_eq!(config.gate_variant, GateVariant::Alternating);
        assert_eq!(config.catalog_style, CatalogStyle::FullRescan);
        assert_eq!(config.selection_policy, SelectionPolicyKind::DisjointBands);
        assert_eq!(config.primary_orientation, PrimaryOrientation::Portrait);
        // Unspecified fields keep their defaults
        assert!(config.notifications_enabled);
        assert_eq!(config.desktop, DesktopConfig::default());
    }

    #[test]
    fn test_validate_rejects_inverted_interval() {
        let config = AgentConfig {
            min_interval_seconds: 600,
            max_interval_seconds: 60,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("greater than"));
    }

    #[test]
    fn test_validate_rejects_zero_interval_and_empty_extensions() {
        let zero = AgentConfig {
            min_interval_seconds: 0,
            ..Default::default()
        };
        assert!(zero.validate().is_err());

        let no_ext = AgentConfig {
            supported_extensions: vec![" ".to_string(), ".".to_string()],
            ..Default::default()
        };
        assert!(no_ext.validate().is_err());
    }

    #[test]
    fn test_extensions_are_normalized() {
        let config = AgentConfig {
            supported_extensions: vec![".JPG".to_string(), "Png".to_string()],
            ..Default::default()
        };
        assert_eq!(config.extensions(), vec!["jpg", "png"]);
    }

    #[test]
    fn test_orientation_filter() {
        assert!(PrimaryOrientation::Landscape.accepts(1920, 1080));
        assert!(!PrimaryOrientation::Landscape.accepts(1080, 1920));
        assert!(PrimaryOrientation::Portrait.accepts(1080, 1920));
        assert!(!PrimaryOrientation::Portrait.accepts(1920, 1080));
        // Squares satisfy both
        assert!(PrimaryOrientation::Landscape.accepts(500, 500));
        assert!(PrimaryOrientation::Portrait.accepts(500, 500));
        assert!(PrimaryOrientation::Any.accepts(1, 1000));
    }

    #[test]
    fn test_load_config_from_path_resolves_relative_directories() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.jsonc");
        fs::write(
            &path,
            r#"{ "watchDirectory": "walls", "cacheDirectory": "fitted" // local
            }"#,
        )
        .unwrap();

        let (config, loaded_from) = load_config_from_path(&path).unwrap();
        assert_eq!(loaded_from, path);
        assert_eq!(config.watch_dir(), temp.path().join("walls"));
        assert_eq!(config.cache_dir(), temp.path().join("fitted"));
    }

    #[test]
    fn test_load_config_from_path_missing_file() {
        let temp = TempDir::new().unwrap();
        let result = load_config_from_path(&temp.path().join("missing.jsonc"));
        assert!(matches!(result, Err(ConfigError::NotFound)));
    }

    #[test]
    fn test_load_config_from_path_invalid_json() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_config_from_path(&path), Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_config_from_path_runs_validation() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        fs::write(&path, r#"{ "minIntervalSeconds": 10, "maxIntervalSeconds": 1 }"#).unwrap();
        assert!(matches!(load_config_from_path(&path), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_default_cache_dir_is_fitted_subdir() {
        let config = AgentConfig::default();
        assert!(config.cache_dir().ends_with("fitted"));
    }

    #[test]
    fn test_config_paths_are_not_empty() {
        let paths = config_paths();
        assert!(!paths.is_empty() || std::env::var("HOME").is_err());
    }

    #[test]
    fn test_config_error_not_found_mentions_location() {
        assert!(ConfigError::NotFound.to_string().contains("No configuration file found"));
    }
}
