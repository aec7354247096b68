//! Error types for the wallpaper agent.
//!
//! `AgentError` is what the binary reports before exiting with a non-zero
//! status. Everything that can go wrong *during* a tick is logged by the
//! scheduler instead of being surfaced here.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::wallpaper::{CatalogError, LockError, NotifyError};

/// Errors that abort the agent or a CLI command.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The watched directory holds no eligible images at startup.
    #[error("no eligible wallpapers in {}; add at least one image", .0.display())]
    EmptyCatalog(PathBuf),
    /// The watched directory is missing or unreadable.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    /// The configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The notification subsystem could not be initialized.
    #[error("Notification init failed: {0}")]
    NotificationInit(#[from] NotifyError),
    /// The session lock-state source could not be reached.
    #[error("Lock state source unavailable: {0}")]
    LockSourceInit(#[from] LockError),
    /// The async runtime or signal handlers could not be set up.
    #[error("Runtime error: {0}")]
    Runtime(String),
    /// Invalid command arguments.
    #[error("{0}")]
    InvalidArguments(String),
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON output failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_catalog_display_names_directory() {
        let err = AgentError::EmptyCatalog(PathBuf::from("/home/me/Pictures/wallpapers"));
        let msg = err.to_string();
        assert!(msg.contains("no eligible wallpapers"));
        assert!(msg.contains("/home/me/Pictures/wallpapers"));
    }

    #[test]
    fn test_io_error_from_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied");
        let err: AgentError = io_err.into();
        assert!(matches!(err, AgentError::Io(_)));
        assert!(err.to_string().contains("IO error"));
    }

    #[test]
    fn test_config_error_is_transparent() {
        let err: AgentError = ConfigError::Invalid("minIntervalSeconds must be at least 1".into()).into();
        assert!(err.to_string().contains("minIntervalSeconds"));
    }

    #[test]
    fn test_notification_init_display() {
        let err: AgentError = NotifyError::Unavailable("no server".into()).into();
        assert!(err.to_string().starts_with("Notification init failed"));
    }

    #[test]
    fn test_error_is_debug() {
        let err = AgentError::InvalidArguments("bad".to_string());
        assert!(format!("{err:?}").contains("InvalidArguments"));
    }
}
