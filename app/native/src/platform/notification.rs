//! Desktop notifications through the freedesktop notification server.

use std::collections::HashMap;

use notify_rust::{Notification, NotificationHandle};

use crate::constants::APP_NAME;
use crate::wallpaper::source::NotificationId;
use crate::wallpaper::{NotificationSink, NotifyError};

/// Shows notifications with `notify-rust` and keeps their handles for closing.
#[derive(Default)]
pub struct DesktopNotifier {
    handles: HashMap<u32, NotificationHandle>,
}

impl std::fmt::Debug for DesktopNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DesktopNotifier").field("open", &self.handles.len()).finish()
    }
}

impl DesktopNotifier {
    /// Checks that a notification server is running.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::Unavailable` if no server answers.
    pub fn connect() -> Result<Self, NotifyError> {
        let info = notify_rust::get_server_information()
            .map_err(|err| NotifyError::Unavailable(err.to_string()))?;
        tracing::debug!(server = %info.name, vendor = %info.vendor, "notification server found");
        Ok(Self::default())
    }
}

impl NotificationSink for DesktopNotifier {
    fn show(&mut self, title: &str, body: &str, icon: &str) -> Result<NotificationId, NotifyError> {
        let handle = Notification::new()
            .appname(APP_NAME)
            .summary(title)
            .body(body)
            .icon(icon)
            .show()
            .map_err(|err| NotifyError::Show(err.to_string()))?;

        let id = handle.id();
        self.handles.insert(id, handle);
        Ok(NotificationId(id))
    }

    fn close(&mut self, id: NotificationId) {
        if let Some(handle) = self.handles.remove(&id.0) {
            handle.close();
        }
    }
}
