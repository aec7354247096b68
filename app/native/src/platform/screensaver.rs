//! Lock state from the session screensaver service over D-Bus.

use zbus::blocking::Connection;

use crate::config::LockScreenConfig;
use crate::wallpaper::{LockError, LockSource};

#[zbus::proxy(
    interface = "org.gnome.ScreenSaver",
    default_service = "org.gnome.ScreenSaver",
    default_path = "/org/gnome/ScreenSaver"
)]
trait ScreenSaver {
    /// Whether the screensaver, and so the lock screen, is active.
    fn get_active(&self) -> zbus::Result<bool>;
}

/// Polls `GetActive` on the configured screensaver object.
pub struct ScreenSaverLock {
    proxy: ScreenSaverProxyBlocking<'static>,
}

impl std::fmt::Debug for ScreenSaverLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScreenSaverLock")
            .field("destination", &self.proxy.inner().destination().to_string())
            .field("path", &self.proxy.inner().path().to_string())
            .finish()
    }
}

impl ScreenSaverLock {
    /// Connects to the session bus and binds the screensaver object.
    ///
    /// # Errors
    ///
    /// Returns `LockError::Connection` if the session bus is unreachable or
    /// the configured name or path is malformed.
    pub fn connect(config: &LockScreenConfig) -> Result<Self, LockError> {
        let connection_error = |err: zbus::Error| LockError::Connection {
            service: config.bus_name.clone(),
            message: err.to_string(),
        };

        let connection = Connection::session().map_err(connection_error)?;
        let proxy = ScreenSaverProxyBlocking::builder(&connection)
            .destination(config.bus_name.clone())
            .map_err(connection_error)?
            .path(config.object_path.clone())
            .map_err(connection_error)?
            .build()
            .map_err(connection_error)?;

        tracing::debug!(
            service = %config.bus_name,
            path = %config.object_path,
            "connected to screensaver service"
        );
        Ok(Self { proxy })
    }
}

impl LockSource for ScreenSaverLock {
    fn is_locked(&self) -> Result<bool, LockError> {
        self.proxy.get_active().map_err(|err| LockError::Query(err.to_string()))
    }
}
