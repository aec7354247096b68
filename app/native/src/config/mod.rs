//! Configuration module for the wallpaper agent.
//!
//! This module provides configuration types, loading functionality, and file watching
//! for hot-reloading configuration changes.
//!
//! The configuration file supports JSONC format (JSON with comments).
//! Both single-line (`//`) and multi-line (`/* */`) comments are allowed.

pub mod template;
pub mod types;
mod watcher;

use std::path::{Path, PathBuf};

pub use types::{
    AgentConfig, CatalogStyle, ConfigError, DesktopConfig, GateVariant, LockScreenConfig,
    PrimaryOrientation, SelectionPolicyKind, SettingKey, config_paths,
    load_config as load_config_default, load_config_from_path,
};
pub use watcher::{ConfigChanged, watch_config_file};

/// A configuration together with the file it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The parsed and validated configuration.
    pub config: AgentConfig,
    /// The file backing the configuration, if any. Watched for changes.
    pub path: Option<PathBuf>,
}

/// Loads the configuration.
///
/// An explicit `custom_path` must exist. Without one, the default search
/// paths are tried; if none exists a commented template is written to the
/// preferred location and the defaults are used.
///
/// # Errors
///
/// Returns a `ConfigError` when the file cannot be read, parsed or validated,
/// or when `custom_path` does not exist.
pub fn load(custom_path: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    let result = custom_path.map_or_else(load_config_default, load_config_from_path);

    match result {
        Ok((config, path)) => {
            tracing::debug!(path = %path.display(), "loaded configuration");
            Ok(LoadedConfig {
                config,
                path: Some(path),
            })
        }
        Err(ConfigError::NotFound) if custom_path.is_none() => Ok(LoadedConfig {
            config: AgentConfig::default(),
            path: create_default_config_file(),
        }),
        Err(err) => Err(err),
    }
}

/// Creates a template configuration file at the default location.
///
/// This is called when no configuration file is found during startup.
fn create_default_config_file() -> Option<PathBuf> {
    let Some(config_path) = config_paths().into_iter().next() else {
        tracing::debug!("no config path available for creating template");
        return None;
    };

    if config_path.exists() {
        return Some(config_path);
    }

    match template::create_config_file(&config_path) {
        Ok(()) => {
            tracing::info!(
                path = %config_path.display(),
                "created default configuration file"
            );
            Some(config_path)
        }
        Err(err) => {
            tracing::debug!(
                error = %err,
                path = %config_path.display(),
                "failed to create default configuration file"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_custom_path_missing_is_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let result = load(Some(&temp.path().join("absent.jsonc")));
        assert!(matches!(result, Err(ConfigError::NotFound)));
    }

    #[test]
    fn test_load_custom_path_keeps_path() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("config.jsonc");
        std::fs::write(&path, r#"{ "notificationsEnabled": false }"#).unwrap();

        let loaded = load(Some(&path)).unwrap();
        assert_eq!(loaded.path.as_deref(), Some(path.as_path()));
        assert!(!loaded.config.notifications_enabled);
    }

    #[test]
    fn test_shared_types_are_available() {
        let config = AgentConfig::default();
        assert_eq!(config.desktop.background.key, "picture-uri");
        assert_eq!(config.lock_screen.bus_name, "org.gnome.ScreenSaver");
        assert_eq!(SelectionPolicyKind::default(), SelectionPolicyKind::NestedBands);
    }
}
