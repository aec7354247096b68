//! Configuration file watcher for hot-reloading.
//!
//! This module watches the configuration file and notifies the scheduler
//! when it changes so the rotation can be rebuilt with the new settings.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc::UnboundedSender;

/// Debounce duration for config file changes.
/// Some editors trigger multiple events per save (write to temp, rename, etc.).
const CONFIG_DEBOUNCE_MS: u64 = 200;

/// Marker sent whenever the watched configuration file changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigChanged;

/// Starts watching the configuration file for changes.
///
/// Spawns a background thread that owns the watcher and forwards debounced
/// change events into `tx`. The thread exits once the receiving side is
/// dropped.
///
/// # Arguments
///
/// * `config_path` - The configuration file that was loaded
/// * `tx` - Channel the scheduler listens on
pub fn watch_config_file(config_path: PathBuf, tx: UnboundedSender<ConfigChanged>) {
    let config_filename =
        config_path.file_name().map(std::ffi::OsStr::to_os_string).unwrap_or_default();

    std::thread::spawn(move || {
        let (event_tx, event_rx) = std::sync::mpsc::channel();

        let mut watcher: RecommendedWatcher = match notify::recommended_watcher(event_tx) {
            Ok(w) => w,
            Err(err) => {
                tracing::warn!(error = %err, "failed to create config watcher");
                return;
            }
        };

        // Watch the parent directory to catch editors that save via rename
        let watch_path = config_path.parent().unwrap_or(&config_path);

        if let Err(err) = watcher.watch(watch_path, RecursiveMode::NonRecursive) {
            tracing::warn!(error = %err, path = %watch_path.display(), "failed to watch config file");
            return;
        }

        tracing::debug!(path = %config_path.display(), "watching config file");

        let mut last_event_time: Option<Instant> = None;
        let debounce_duration = Duration::from_millis(CONFIG_DEBOUNCE_MS);

        loop {
            match event_rx.recv() {
                Ok(Ok(event)) => {
                    let affects_config = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().is_some_and(|name| name == config_filename));

                    if !affects_config || !(event.kind.is_modify() || event.kind.is_create()) {
                        continue;
                    }

                    let now = Instant::now();
                    if last_event_time.is_some_and(|t| now.duration_since(t) < debounce_duration) {
                        continue;
                    }
                    last_event_time = Some(now);

                    tracing::info!(path = %config_path.display(), "config file changed");
                    if tx.send(ConfigChanged).is_err() {
                        // Scheduler is gone
                        break;
                    }
                }
                Ok(Err(err)) => {
                    tracing::warn!(error = %err, "config watch error");
                }
                Err(_) => break,
            }
        }
    });
}
