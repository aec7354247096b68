//! Linux desktop integration.
//!
//! - [`display`] - Connected displays from the DRM sysfs tree
//! - [`gsettings`] - Picture URI writes through `gsettings`
//! - [`notification`] - Freedesktop notifications
//! - [`screensaver`] - Lock state from the screensaver D-Bus service
//! - [`path`] - Path expansion helpers

pub mod display;
pub mod gsettings;
pub mod notification;
pub mod path;
pub mod screensaver;

pub use display::DrmDisplays;
pub use gsettings::GSettingsSink;
pub use notification::DesktopNotifier;
pub use screensaver::ScreenSaverLock;
