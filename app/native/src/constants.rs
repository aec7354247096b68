//! Application-wide constants.

/// Application identifier used for cache and configuration directories.
pub const APP_ID: &str = "wallpaper-agent";

/// Application name shown as the notification source.
pub const APP_NAME: &str = "Wallpapers";
