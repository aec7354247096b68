//! Desktop picture settings via the `gsettings` tool.

use std::process::Command;

use crate::config::{DesktopConfig, SettingKey};
use crate::wallpaper::{SettingError, SettingScope, SettingSink};

/// Key written next to the background key when the dark variant is enabled.
const DARK_VARIANT_KEY: &str = "picture-uri-dark";

/// Writes picture URIs with `gsettings set`.
#[derive(Debug, Clone)]
pub struct GSettingsSink {
    desktop: DesktopConfig,
    program: String,
}

impl GSettingsSink {
    #[must_use]
    pub fn new(desktop: DesktopConfig) -> Self {
        Self {
            desktop,
            program: "gsettings".to_string(),
        }
    }

    /// Uses a different executable in place of `gsettings`.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    const fn key_for(&self, scope: SettingScope) -> &SettingKey {
        match scope {
            SettingScope::Background => &self.desktop.background,
            SettingScope::Screensaver => &self.desktop.screensaver,
        }
    }

    fn write(&self, scope: SettingScope, schema: &str, key: &str, uri: &str) -> Result<(), SettingError> {
        let output = Command::new(&self.program).args(["set", schema, key, uri]).output()?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let message = if stderr.is_empty() {
            format!("{} exited with {}", self.program, output.status)
        } else {
            stderr
        };
        Err(SettingError::WriteFailed { scope, message })
    }
}

impl SettingSink for GSettingsSink {
    fn set_picture_uri(&self, scope: SettingScope, uri: &str) -> Result<(), SettingError> {
        let key = self.key_for(scope);
        if key.schema.is_empty() || key.key.is_empty() {
            return Err(SettingError::UnsupportedScope(scope));
        }

        self.write(scope, &key.schema, &key.key, uri)?;

        // Best effort: not every desktop has the dark key
        if scope == SettingScope::Background && self.desktop.dark_variant {
            if let Err(err) = self.write(scope, &key.schema, DARK_VARIANT_KEY, uri) {
                tracing::debug!(error = %err, "dark variant not updated");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_with_true_program() {
        let sink = GSettingsSink::new(DesktopConfig::default()).with_program("true");
        assert!(sink.set_picture_uri(SettingScope::Background, "file:///a.jpg").is_ok());
        assert!(sink.set_picture_uri(SettingScope::Screensaver, "file:///a.jpg").is_ok());
    }

    #[test]
    fn test_failure_with_false_program() {
        let sink = GSettingsSink::new(DesktopConfig::default()).with_program("false");
        let err = sink.set_picture_uri(SettingScope::Background, "file:///a.jpg").unwrap_err();
        assert!(matches!(err, SettingError::WriteFailed { scope: SettingScope::Background, .. }));
    }

    #[test]
    fn test_missing_program_is_io_error() {
        let sink = GSettingsSink::new(DesktopConfig::default())
            .with_program("/nonexistent/wallpaper-agent-gsettings");
        let err = sink.set_picture_uri(SettingScope::Background, "file:///a.jpg").unwrap_err();
        assert!(matches!(err, SettingError::Io(_)));
    }

    #[test]
    fn test_empty_key_is_unsupported() {
        let mut desktop = DesktopConfig::default();
        desktop.screensaver.key = String::new();
        let sink = GSettingsSink::new(desktop).with_program("true");
        let err = sink.set_picture_uri(SettingScope::Screensaver, "file:///a.jpg").unwrap_err();
        assert!(matches!(err, SettingError::UnsupportedScope(SettingScope::Screensaver)));
    }
}
