//! Notification coordinator.
//!
//! Keeps at most one live notification per target, replacing the previous
//! one on every change.

use std::collections::HashMap;

use super::gate::Target;
use super::source::{NotificationId, NotificationSink};

/// Icon hint sent with every notification.
pub const NOTIFICATION_ICON: &str = "image-x-generic-symbolic";

/// Shows one notification per target.
pub struct Notifier {
    sink: Option<Box<dyn NotificationSink>>,
    handles: HashMap<Target, NotificationId>,
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("enabled", &self.is_enabled())
            .field("handles", &self.handles)
            .finish()
    }
}

impl Notifier {
    /// Creates a coordinator backed by `sink`.
    #[must_use]
    pub fn new(sink: Box<dyn NotificationSink>) -> Self {
        Self {
            sink: Some(sink),
            handles: HashMap::new(),
        }
    }

    /// Creates a coordinator that never shows anything.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            sink: None,
            handles: HashMap::new(),
        }
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool { self.sink.is_some() }

    /// Announces a new image for `target`.
    ///
    /// Does nothing while the session is locked. Failures are logged.
    pub fn notify(&mut self, target: Target, image_name: &str, locked: bool) {
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        if locked {
            return;
        }

        if let Some(previous) = self.handles.remove(&target) {
            sink.close(previous);
        }

        match sink.show(target.title(), image_name, NOTIFICATION_ICON) {
            Ok(id) => {
                self.handles.insert(target, id);
            }
            Err(err) => {
                tracing::warn!(error = %err, kind = %target, "failed to show notification");
            }
        }
    }

    /// Closes every held notification.
    pub fn close_all(&mut self) {
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        for (_, id) in self.handles.drain() {
            sink.close(id);
        }
    }
}
